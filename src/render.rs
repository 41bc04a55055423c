use crate::config::{ConnectorConfig, RenderConfig};
use crate::error::{ConnectorError, Result};
use crate::geometry::{Anchors, ConnectorCurve, Point, Rect, select_anchors};
use crate::noise::Strand;
use crate::surface::{StrokeStyle, Surface};
use crate::theme::Theme;
use std::f32::consts::PI;
use std::path::Path;

/// Fixed geometry of one connection: anchors and the curve through the
/// surface centre. Recreate it when the rects or the surface size change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorScene {
    pub anchors: Anchors,
    pub curve: ConnectorCurve,
}

impl ConnectorScene {
    pub fn new(from: &Rect, to: &Rect, surface_width: f32, surface_height: f32, config: &ConnectorConfig) -> Self {
        let anchors = select_anchors(from, to, config.exit_threshold);
        let curve = ConnectorCurve::between(&anchors, surface_width, surface_height)
            .with_model(config.curve_model);
        Self { anchors, curve }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrandPath {
    pub points: Vec<Point>,
    pub width: f32,
}

impl StrandPath {
    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub elapsed_ms: f32,
    pub drawn: bool,
    pub strands: Vec<StrandPath>,
}

fn ramp(elapsed_ms: f32, duration_ms: f32) -> f32 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

pub fn stroke_width(elapsed_ms: f32, config: &ConnectorConfig) -> f32 {
    config.max_stroke_width * ramp(elapsed_ms, config.stroke_width_ramp_ms)
}

/// Visible parameter range `[start, end)`. Starts empty and opens up to
/// `[window_start, window_end]` once both ramps finish.
pub fn sample_window(elapsed_ms: f32, config: &ConnectorConfig) -> (f32, f32) {
    let start = 1.0 - (1.0 - config.window_start) * ramp(elapsed_ms, config.window_start_ramp_ms);
    let end = config.window_end * ramp(elapsed_ms, config.window_end_ramp_ms);
    (start, end)
}

pub fn deviance(elapsed_ms: f32, config: &ConnectorConfig) -> f32 {
    config.max_deviance * ramp(elapsed_ms, config.deviance_ramp_ms)
}

/// Near zero at both ends of the curve, 1 in the middle.
pub fn bell(i: f32) -> f32 {
    let s = ((i * 0.9 + 0.1) * PI).sin();
    s * s
}

pub fn strand_path(
    curve: &ConnectorCurve,
    strand: &Strand,
    elapsed_ms: f32,
    config: &ConnectorConfig,
) -> StrandPath {
    let width = stroke_width(elapsed_ms, config);
    let mut points = Vec::new();
    if !(config.step > 0.0) {
        return StrandPath { points, width };
    }

    let (start, end) = sample_window(elapsed_ms, config);
    let max_deviance = deviance(elapsed_ms, config);
    let time = elapsed_ms / config.noise_time_scale_ms;

    let mut k = 0usize;
    loop {
        let i = start + k as f32 * config.step;
        if i >= end {
            break;
        }
        let (x, y) = curve.point(i);
        let point = match curve.normal(i) {
            Some((nx, ny)) => {
                let noise = strand.displacement(
                    i,
                    time,
                    config.high_frequency_multiplier,
                    config.high_frequency_weight,
                );
                let offset = max_deviance * bell(i) * noise;
                (x + nx * offset, y + ny * offset)
            }
            None => (x, y),
        };
        points.push(point);
        k += 1;
    }

    StrandPath { points, width }
}

/// Clears `surface` and draws every strand for `elapsed_ms`. A detached
/// surface is left untouched.
pub fn render_frame<S: Surface + ?Sized>(
    surface: &mut S,
    curve: &ConnectorCurve,
    strands: &[Strand],
    elapsed_ms: f32,
    config: &ConnectorConfig,
    theme: &Theme,
) -> FrameReport {
    if !surface.is_attached() {
        return FrameReport {
            elapsed_ms,
            drawn: false,
            strands: Vec::new(),
        };
    }

    surface.clear();
    let mut paths = Vec::with_capacity(strands.len());
    for strand in strands {
        let path = strand_path(curve, strand, elapsed_ms, config);
        if let (Some(first), Some(last)) = (path.first(), path.last()) {
            let style = StrokeStyle {
                color: theme.stroke_color.clone(),
                width: path.width,
                blur: theme.glow_blur,
                glow_color: theme.glow_color.clone(),
            };
            for _ in 0..config.stroke_passes {
                surface.stroke_path(&path.points, &style);
            }
            surface.fill_circle(first, config.marker_radius, &theme.marker_color);
            surface.fill_circle(last, config.marker_radius, &theme.marker_color);
        }
        paths.push(path);
    }

    FrameReport {
        elapsed_ms,
        drawn: true,
        strands: paths,
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg).map_err(|source| ConnectorError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|err| ConnectorError::Raster(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| ConnectorError::Raster("failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .save_png(output)
        .map_err(|err| ConnectorError::Raster(err.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(ConnectorError::Raster(
        "PNG output requires the `png` feature".to_string(),
    ))
}
