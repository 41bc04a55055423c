use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::geometry::Rect;
use crate::noise::Strand;
use crate::render::{ConnectorScene, FrameReport, render_frame};
use crate::scheduler::{FrameRequestId, FrameScheduler};
use crate::surface::Surface;
use crate::theme::Theme;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Starts connector animations. Holds the tuning shared by every run it
/// starts; each run gets its own strands and scheduling chain.
#[derive(Debug, Clone)]
pub struct AnimatedConnector {
    pub config: ConnectorConfig,
    pub theme: Theme,
}

impl Default for AnimatedConnector {
    fn default() -> Self {
        Self::new(ConnectorConfig::default(), Theme::electric())
    }
}

impl AnimatedConnector {
    pub fn new(config: ConnectorConfig, theme: Theme) -> Self {
        Self { config, theme }
    }

    /// Animates an arc from `from` to `to` on `surface` until the returned
    /// handle is stopped or the surface is detached.
    ///
    /// The rects are fixed for the run; recreate the animation if they move.
    pub fn start<S: Surface + 'static>(
        &self,
        surface: S,
        from: Rect,
        to: Rect,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> AnimationHandle<S> {
        let scene = ConnectorScene::new(&from, &to, surface.width(), surface.height(), &self.config);
        let strands = Strand::spawn(self.config.strand_count, self.config.seed);
        tracing::debug!(
            strands = strands.len(),
            exit = ?scene.anchors.exit,
            "connector animation started"
        );
        let state = Rc::new(RunState {
            started_at: scheduler.now(),
            scheduler,
            surface: RefCell::new(surface),
            scene,
            strands,
            config: self.config.clone(),
            theme: self.theme.clone(),
            stopped: Cell::new(false),
            finished: Cell::new(false),
            pending: Cell::new(None),
            frames_rendered: Cell::new(0),
            last_report: RefCell::new(None),
        });
        schedule(&state);
        AnimationHandle { state }
    }

    pub fn try_start<S: Surface + 'static>(
        &self,
        surface: S,
        from: Rect,
        to: Rect,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Result<AnimationHandle<S>> {
        self.config.validate()?;
        Ok(self.start(surface, from, to, scheduler))
    }
}

struct RunState<S> {
    scheduler: Rc<dyn FrameScheduler>,
    surface: RefCell<S>,
    scene: ConnectorScene,
    strands: Vec<Strand>,
    config: ConnectorConfig,
    theme: Theme,
    started_at: f64,
    stopped: Cell<bool>,
    finished: Cell<bool>,
    pending: Cell<Option<FrameRequestId>>,
    frames_rendered: Cell<u64>,
    last_report: RefCell<Option<FrameReport>>,
}

fn schedule<S: Surface + 'static>(state: &Rc<RunState<S>>) {
    let next = Rc::clone(state);
    let id = state
        .scheduler
        .request_frame(Box::new(move |timestamp| on_frame(&next, timestamp)));
    if id.is_none() {
        state.finished.set(true);
        tracing::warn!(
            frames = state.frames_rendered.get(),
            "frame request refused, connector animation finished"
        );
    }
    state.pending.set(id);
}

fn on_frame<S: Surface + 'static>(state: &Rc<RunState<S>>, timestamp: f64) {
    state.pending.set(None);
    if state.stopped.get() {
        return;
    }

    let elapsed_ms = (timestamp - state.started_at).max(0.0) as f32;
    let report = {
        let mut surface = state.surface.borrow_mut();
        if !surface.is_attached() {
            state.finished.set(true);
            tracing::debug!(elapsed_ms, "surface detached, connector animation finished");
            return;
        }
        render_frame(
            &mut *surface,
            &state.scene.curve,
            &state.strands,
            elapsed_ms,
            &state.config,
            &state.theme,
        )
    };
    tracing::trace!(elapsed_ms, strands = report.strands.len(), "connector frame");
    state.frames_rendered.set(state.frames_rendered.get() + 1);
    *state.last_report.borrow_mut() = Some(report);

    if !state.stopped.get() {
        schedule(state);
    }
}

/// Lifecycle token for one running animation.
///
/// Dropping the handle does not stop the animation; use [`AnimationGuard`]
/// for that.
pub struct AnimationHandle<S> {
    state: Rc<RunState<S>>,
}

impl<S> Clone for AnimationHandle<S> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl<S> AnimationHandle<S> {
    /// Stops scheduling frames. Already drawn frames stay on the surface.
    /// Calling it again has no effect.
    pub fn stop(&self) {
        if self.state.stopped.replace(true) {
            return;
        }
        if let Some(id) = self.state.pending.take() {
            self.state.scheduler.cancel_frame(id);
        }
        tracing::debug!(
            frames = self.state.frames_rendered.get(),
            "connector animation stopped"
        );
    }

    pub fn is_stopped(&self) -> bool {
        self.state.stopped.get()
    }

    /// False once stopped, once the surface was found detached, or once the
    /// scheduler refused a frame request.
    pub fn is_running(&self) -> bool {
        !self.state.stopped.get() && !self.state.finished.get()
    }

    pub fn has_pending_frame(&self) -> bool {
        self.state.pending.get().is_some()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.state.frames_rendered.get()
    }

    pub fn scene(&self) -> ConnectorScene {
        self.state.scene
    }

    pub fn strand_seeds(&self) -> Vec<u64> {
        self.state.strands.iter().map(|strand| strand.seed).collect()
    }

    pub fn last_report(&self) -> Option<FrameReport> {
        self.state.last_report.borrow().clone()
    }

    /// Gives access to the surface between frames.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut self.state.surface.borrow_mut())
    }
}

/// Stops the wrapped animation when dropped.
pub struct AnimationGuard<S> {
    handle: AnimationHandle<S>,
}

impl<S> AnimationGuard<S> {
    pub fn new(handle: AnimationHandle<S>) -> Self {
        Self { handle }
    }

    pub fn handle(&self) -> &AnimationHandle<S> {
        &self.handle
    }
}

impl<S> Drop for AnimationGuard<S> {
    fn drop(&mut self) {
        self.handle.stop();
    }
}
