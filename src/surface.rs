use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f32,
    pub blur: f32,
    pub glow_color: String,
}

/// Drawing target for connector frames.
///
/// A surface has a single writer: the animation that owns it clears and
/// redraws it every frame.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self);
    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle);
    fn fill_circle(&mut self, center: Point, radius: f32, color: &str);
    /// Whether the surface is still part of a live visual tree.
    fn is_attached(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Stroke { points: Vec<Point>, style: StrokeStyle },
    Circle { center: Point, radius: f32, color: String },
}

/// Keeps every draw call, for inspection by hosts and tests.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
    attached: bool,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
            attached: true,
        }
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    pub fn clear_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, DrawCommand::Clear))
            .count()
    }

    /// Commands issued since the most recent clear.
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|cmd| matches!(cmd, DrawCommand::Clear))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle) {
        self.commands.push(DrawCommand::Stroke {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color: color.to_string(),
        });
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

/// Holds the current frame as SVG elements; `to_svg` serializes it.
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f32,
    height: f32,
    background: Option<String>,
    elements: Vec<String>,
    filters: Vec<(f32, String)>,
    attached: bool,
}

impl SvgSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: None,
            elements: Vec::new(),
            filters: Vec::new(),
            attached: true,
        }
    }

    pub fn with_background(mut self, background: &str) -> Self {
        self.background = Some(background.to_string());
        self
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }

    fn glow_filter(&mut self, blur: f32, color: &str) -> usize {
        if let Some(idx) = self
            .filters
            .iter()
            .position(|(b, c)| *b == blur && c == color)
        {
            return idx;
        }
        self.filters.push((blur, color.to_string()));
        self.filters.len() - 1
    }

    pub fn to_svg(&self) -> String {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        ));
        if let Some(background) = &self.background {
            svg.push_str(&format!(
                "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
                escape_xml(background)
            ));
        }
        if !self.filters.is_empty() {
            svg.push_str("<defs>");
            for (idx, (blur, color)) in self.filters.iter().enumerate() {
                // Canvas shadowBlur is roughly twice the Gaussian deviation.
                let deviation = blur / 2.0;
                svg.push_str(&format!(
                    "<filter id=\"glow-{idx}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur in=\"SourceAlpha\" stdDeviation=\"{deviation:.2}\" result=\"blur\"/><feFlood flood-color=\"{}\" result=\"tint\"/><feComposite in=\"tint\" in2=\"blur\" operator=\"in\" result=\"glow\"/><feMerge><feMergeNode in=\"glow\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>",
                    escape_xml(color)
                ));
            }
            svg.push_str("</defs>");
        }
        for element in &self.elements {
            svg.push_str(element);
        }
        svg.push_str("</svg>");
        svg
    }
}

impl Surface for SvgSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.elements.clear();
        self.filters.clear();
    }

    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle) {
        if points.is_empty() {
            return;
        }
        let filter = if style.blur > 0.0 {
            let idx = self.glow_filter(style.blur, &style.glow_color);
            format!(" filter=\"url(#glow-{idx})\"")
        } else {
            String::new()
        };
        self.elements.push(format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"{} />",
            points_to_path(points),
            escape_xml(&style.color),
            style.width,
            filter
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) {
        self.elements.push(format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\"/>",
            center.0,
            center.1,
            radius,
            escape_xml(color)
        ));
    }

    fn is_attached(&self) -> bool {
        self.attached
    }
}

fn points_to_path(points: &[Point]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glow_style() -> StrokeStyle {
        StrokeStyle {
            color: "#fff".to_string(),
            width: 4.0,
            blur: 10.0,
            glow_color: "#eeeeff99".to_string(),
        }
    }

    #[test]
    fn svg_surface_serializes_frame() {
        let mut surface = SvgSurface::new(200.0, 100.0).with_background("#312F54");
        surface.stroke_path(&[(0.0, 0.0), (10.0, 5.0)], &glow_style());
        surface.fill_circle((10.0, 5.0), 5.0, "#fff");
        let svg = surface.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("M 0.00 0.00 L 10.00 5.00"));
        assert!(svg.contains("filter=\"url(#glow-0)\""));
        assert!(svg.contains("<circle cx=\"10.00\" cy=\"5.00\" r=\"5.00\""));
        assert!(svg.contains("fill=\"#312F54\""));
    }

    #[test]
    fn svg_surface_shares_identical_filters() {
        let mut surface = SvgSurface::new(50.0, 50.0);
        surface.stroke_path(&[(0.0, 0.0), (1.0, 1.0)], &glow_style());
        surface.stroke_path(&[(0.0, 0.0), (2.0, 2.0)], &glow_style());
        assert_eq!(surface.to_svg().matches("<filter").count(), 1);
    }

    #[test]
    fn clear_drops_previous_frame() {
        let mut surface = SvgSurface::new(50.0, 50.0);
        surface.fill_circle((1.0, 1.0), 2.0, "#fff");
        surface.clear();
        assert!(!surface.to_svg().contains("<circle"));
    }

    #[test]
    fn recording_surface_tracks_last_frame() {
        let mut surface = RecordingSurface::new(10.0, 10.0);
        surface.clear();
        surface.fill_circle((1.0, 1.0), 2.0, "#fff");
        surface.clear();
        surface.fill_circle((3.0, 3.0), 2.0, "#fff");
        assert_eq!(surface.clear_count(), 2);
        assert_eq!(surface.last_frame().len(), 1);
        assert!(surface.is_attached());
        surface.detach();
        assert!(!surface.is_attached());
    }
}
