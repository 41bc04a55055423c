use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ConnectorError;

pub type Point = (f32, f32);

/// Anchor region in surface-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn top_center(&self) -> Point {
        (self.center_x(), self.y)
    }

    pub fn bottom_center(&self) -> Point {
        (self.center_x(), self.y + self.height)
    }

    pub fn left_center(&self) -> Point {
        (self.x, self.center_y())
    }

    pub fn right_center(&self) -> Point {
        (self.x + self.width, self.center_y())
    }
}

impl FromStr for Rect {
    type Err = ConnectorError;

    /// Parses `x,y,width,height`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ConnectorError::InvalidRect {
            input: input.to_string(),
        };
        let values = input
            .split(',')
            .map(|part| part.trim().parse::<f32>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        match values.as_slice() {
            [x, y, width, height] if values.iter().all(|v| v.is_finite()) => {
                Ok(Rect::new(*x, *y, *width, *height))
            }
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitSide {
    Bottom,
    Right,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchors {
    pub from: Point,
    pub to: Point,
    pub exit: ExitSide,
}

/// Picks the curve endpoints for a connection between two rects.
///
/// The connection leaves `from` on the side facing `to` (bottom when the two
/// centres are within `threshold` horizontally) and always enters `to` at the
/// middle of its top edge.
pub fn select_anchors(from: &Rect, to: &Rect, threshold: f32) -> Anchors {
    let diff_x = to.center_x() - from.center_x();
    let (exit, start) = if diff_x > threshold {
        (ExitSide::Right, from.right_center())
    } else if diff_x < -threshold {
        (ExitSide::Left, from.left_center())
    } else {
        (ExitSide::Bottom, from.bottom_center())
    };
    Anchors {
        from: start,
        to: to.top_center(),
        exit,
    }
}

/// How the tangent of the connector curve is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveModel {
    /// Two-segment linear blend of the control polygon legs.
    #[default]
    Blended,
    /// True derivative of the cubic with control points P0, P1, P2, P2.
    Analytic,
}

/// Cubic blend over three control points, the last weighted twice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorCurve {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub model: CurveModel,
}

impl ConnectorCurve {
    pub fn new(p0: Point, p1: Point, p2: Point) -> Self {
        Self {
            p0,
            p1,
            p2,
            model: CurveModel::Blended,
        }
    }

    pub fn with_model(mut self, model: CurveModel) -> Self {
        self.model = model;
        self
    }

    /// Curve through `anchors`, bent towards the centre of a surface of the
    /// given size.
    pub fn between(anchors: &Anchors, surface_width: f32, surface_height: f32) -> Self {
        Self::new(
            anchors.from,
            (surface_width / 2.0, surface_height / 2.0),
            anchors.to,
        )
    }

    pub fn point(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let tt = t * t;
        let uu = u * u;
        let uuu = uu * u;
        let ttt = tt * t;
        let blend = |a: f32, b: f32, c: f32| uuu * a + 3.0 * uu * t * b + 3.0 * u * tt * c + ttt * c;
        (
            blend(self.p0.0, self.p1.0, self.p2.0),
            blend(self.p0.1, self.p1.1, self.p2.1),
        )
    }

    pub fn derivative(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let leg_a = (self.p1.0 - self.p0.0, self.p1.1 - self.p0.1);
        let leg_b = (self.p2.0 - self.p1.0, self.p2.1 - self.p1.1);
        match self.model {
            CurveModel::Blended => (u * leg_a.0 + t * leg_b.0, u * leg_a.1 + t * leg_b.1),
            CurveModel::Analytic => {
                let wa = 3.0 * u * u;
                let wb = 6.0 * u * t;
                (wa * leg_a.0 + wb * leg_b.0, wa * leg_a.1 + wb * leg_b.1)
            }
        }
    }

    /// Unit normal at `t`, or `None` where the tangent vanishes.
    pub fn normal(&self, t: f32) -> Option<Point> {
        let (dx, dy) = self.derivative(t);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some((-dy / len, dx / len))
    }
}
