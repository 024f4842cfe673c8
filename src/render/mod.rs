mod frame;
mod null_renderer;
mod primitives;
pub mod scheduler;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, PolygonPrimitive, RectPrimitive, StrokeStyle, TextHAlign, TextPrimitive,
};
pub use scheduler::{
    FrameLoopHandle, FrameLoopKind, FrameLoopRegistry, PendingPaint, RenderScheduler,
    SchedulerConfig,
};

use crate::core::Surface;
use crate::error::ChartResult;

/// Contract implemented by any drawing backend.
///
/// Backends receive a fully materialized `RenderFrame`, so drawing code
/// stays isolated from chart state and interaction logic.
pub trait Renderer {
    /// Acquires the drawing context. Called once by `ChartEngine::new`.
    fn prepare(&mut self) -> ChartResult<()> {
        Ok(())
    }

    /// Current drawable size, queried at every paint and input event.
    fn surface(&self) -> Surface;

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}
