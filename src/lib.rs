#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod frame_dump;
pub mod geometry;
pub mod noise;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, ConnectorConfig, RenderConfig, load_config, parse_config};
pub use driver::{AnimatedConnector, AnimationGuard, AnimationHandle};
pub use error::ConnectorError;
pub use geometry::{Anchors, ConnectorCurve, CurveModel, ExitSide, Point, Rect, select_anchors};
pub use noise::{SimplexNoise, Strand};
pub use render::{ConnectorScene, FrameReport, StrandPath, render_frame, strand_path};
pub use scheduler::{FrameCallback, FrameRequestId, FrameScheduler, ManualScheduler};
pub use surface::{DrawCommand, RecordingSurface, StrokeStyle, Surface, SvgSurface};
pub use theme::Theme;
