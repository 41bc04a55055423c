use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use arc_connector::{
    AnimatedConnector, AnimationHandle, ConnectorConfig, FrameCallback, FrameRequestId,
    FrameScheduler, Point, Rect, StrokeStyle, Surface, Theme,
};
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectorOptions {
    theme: Option<String>,
    strand_count: Option<usize>,
    stroke_color: Option<String>,
    glow_color: Option<String>,
    seed: Option<u64>,
    connector: Option<ConnectorConfig>,
}

fn build_connector(options: ConnectorOptions, fallback_seed: u64) -> AnimatedConnector {
    let theme = options
        .theme
        .as_deref()
        .and_then(Theme::by_name)
        .unwrap_or_else(Theme::electric);
    let mut connector = AnimatedConnector::new(options.connector.unwrap_or_default(), theme);

    if let Some(count) = options.strand_count {
        connector.config.strand_count = count;
    }
    if let Some(color) = options.stroke_color {
        connector.theme.marker_color = color.clone();
        connector.theme.stroke_color = color;
    }
    if let Some(color) = options.glow_color {
        connector.theme.glow_color = color;
    }
    connector.config.seed = options.seed.or(connector.config.seed).or(Some(fallback_seed));
    connector
}

fn random_seed() -> u64 {
    let high = (js_sys::Math::random() * u32::MAX as f64) as u64;
    let low = (js_sys::Math::random() * u32::MAX as f64) as u64;
    (high << 32) | low
}

struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl Surface for CanvasSurface {
    fn width(&self) -> f32 {
        self.canvas.width() as f32
    }

    fn height(&self) -> f32 {
        self.canvas.height() as f32
    }

    fn clear(&mut self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    fn stroke_path(&mut self, points: &[Point], style: &StrokeStyle) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.ctx.set_stroke_style_str(&style.color);
        self.ctx.set_line_width(style.width as f64);
        self.ctx.set_shadow_blur(style.blur as f64);
        self.ctx.set_shadow_color(&style.glow_color);
        self.ctx.begin_path();
        self.ctx.move_to(first.0 as f64, first.1 as f64);
        for point in rest {
            self.ctx.line_to(point.0 as f64, point.1 as f64);
        }
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        if self
            .ctx
            .arc(
                center.0 as f64,
                center.1 as f64,
                radius as f64,
                0.0,
                std::f64::consts::TAU,
            )
            .is_ok()
        {
            self.ctx.fill();
        }
    }

    fn is_attached(&self) -> bool {
        self.canvas.is_connected()
    }
}

/// Callbacks waiting on the browser, keyed by animation frame request id.
///
/// An entry leaves the table when it is cancelled, which drops everything its
/// callback captured. A fired entry moves to `retired` because it is still on
/// the call stack; the next fired entry replaces it.
struct PendingFrames<C> {
    entries: RefCell<HashMap<i32, C>>,
    retired: RefCell<Option<C>>,
}

impl<C> Default for PendingFrames<C> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
            retired: RefCell::new(None),
        }
    }
}

impl<C> PendingFrames<C> {
    fn insert(&self, id: i32, entry: C) {
        self.entries.borrow_mut().insert(id, entry);
    }

    fn retire(&self, id: i32) {
        let fired = self.entries.borrow_mut().remove(&id);
        let previous = self.retired.replace(fired);
        drop(previous);
    }

    fn cancel(&self, id: i32) {
        let cancelled = self.entries.borrow_mut().remove(&id);
        drop(cancelled);
    }

    fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

struct AnimationFrameScheduler {
    window: Window,
    frames: Rc<PendingFrames<Closure<dyn FnMut(f64)>>>,
}

impl AnimationFrameScheduler {
    fn new(window: Window) -> Self {
        Self {
            window,
            frames: Rc::new(PendingFrames::default()),
        }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn now(&self) -> f64 {
        self.window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    fn request_frame(&self, callback: FrameCallback) -> Option<FrameRequestId> {
        let frames = Rc::downgrade(&self.frames);
        let request_id = Rc::new(Cell::new(None::<i32>));
        let own_id = Rc::clone(&request_id);
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            let Some(callback) = callback.take() else {
                return;
            };
            if let (Some(frames), Some(id)) = (frames.upgrade(), own_id.get()) {
                frames.retire(id);
            }
            callback(timestamp);
        });
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => {
                request_id.set(Some(id));
                self.frames.insert(id, closure);
                Some(FrameRequestId(id as u64))
            }
            Err(error) => {
                tracing::warn!(?error, "requestAnimationFrame failed");
                None
            }
        }
    }

    fn cancel_frame(&self, id: FrameRequestId) {
        let id = id.0 as i32;
        let _ = self.window.cancel_animation_frame(id);
        self.frames.cancel(id);
    }
}

#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct AnchorRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[wasm_bindgen]
impl AnchorRect {
    #[wasm_bindgen(constructor)]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> AnchorRect {
        AnchorRect {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<&AnchorRect> for Rect {
    fn from(rect: &AnchorRect) -> Self {
        Rect::new(rect.x, rect.y, rect.width, rect.height)
    }
}

#[wasm_bindgen]
pub struct ConnectorHandle {
    handle: AnimationHandle<CanvasSurface>,
}

#[wasm_bindgen]
impl ConnectorHandle {
    pub fn stop(&self) {
        self.handle.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    #[wasm_bindgen(js_name = framesRendered)]
    pub fn frames_rendered(&self) -> f64 {
        self.handle.frames_rendered() as f64
    }
}

/// Animates an electricity arc between two rects on `canvas` until the
/// returned handle is stopped or the canvas leaves the document.
#[wasm_bindgen(js_name = drawElectricity)]
pub fn draw_electricity(
    canvas: HtmlCanvasElement,
    from: &AnchorRect,
    to: &AnchorRect,
    options_json: Option<String>,
) -> Result<ConnectorHandle, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<ConnectorOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        ConnectorOptions::default()
    };
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let connector = build_connector(options, random_seed());
    let surface = CanvasSurface { canvas, ctx };
    let scheduler: Rc<dyn FrameScheduler> = Rc::new(AnimationFrameScheduler::new(window));
    let handle = connector
        .try_start(surface, from.into(), to.into(), scheduler)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    Ok(ConnectorHandle { handle })
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use arc_connector::{CurveModel, Theme};

    use crate::{ConnectorOptions, PendingFrames, build_connector};

    #[test]
    fn options_override_defaults() {
        let options: ConnectorOptions = serde_json::from_str(
            r##"{
                "theme": "ink",
                "strandCount": 3,
                "strokeColor": "#00ff00",
                "connector": { "maxDeviance": 9, "curveModel": "analytic" }
            }"##,
        )
        .expect("options should parse");
        let connector = build_connector(options, 11);

        assert_eq!(connector.config.strand_count, 3);
        assert_eq!(connector.config.max_deviance, 9.0);
        assert_eq!(connector.config.curve_model, CurveModel::Analytic);
        assert_eq!(connector.config.seed, Some(11));
        assert_eq!(connector.theme.stroke_color, "#00ff00");
        assert_eq!(connector.theme.glow_color, Theme::ink().glow_color);
    }

    #[test]
    fn pinned_seed_wins_over_fallback() {
        let options: ConnectorOptions = serde_json::from_str(r#"{ "seed": 5 }"#).unwrap();
        let connector = build_connector(options, 11);
        assert_eq!(connector.config.seed, Some(5));
        assert_eq!(connector.theme, Theme::electric());
    }

    #[test]
    fn cancelled_frames_release_their_captures() {
        let run_state = Rc::new(());
        let frames = PendingFrames::default();
        frames.insert(7, Rc::clone(&run_state));
        frames.insert(8, Rc::clone(&run_state));
        assert_eq!(Rc::strong_count(&run_state), 3);

        frames.cancel(7);
        frames.cancel(7);
        assert_eq!(frames.len(), 1);
        assert_eq!(Rc::strong_count(&run_state), 2);

        frames.cancel(8);
        assert_eq!(frames.len(), 0);
        assert_eq!(Rc::strong_count(&run_state), 1);
    }

    #[test]
    fn fired_frames_are_released_by_the_next_fire() {
        let run_state = Rc::new(());
        let frames = PendingFrames::default();
        frames.insert(1, Rc::clone(&run_state));
        frames.retire(1);
        assert_eq!(frames.len(), 0);
        assert_eq!(Rc::strong_count(&run_state), 2);

        frames.insert(2, Rc::new(()));
        frames.retire(2);
        assert_eq!(Rc::strong_count(&run_state), 1);
    }
}
