use crate::core::Surface;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer};

/// Headless renderer for tests and server-side use.
///
/// Validates every frame and keeps counters so tests can observe paints.
#[derive(Debug, Clone)]
pub struct NullRenderer {
    pub surface: Surface,
    pub frames_rendered: usize,
    pub last_rect_count: usize,
    pub last_line_count: usize,
    pub last_text_count: usize,
    pub last_frame: Option<RenderFrame>,
}

impl NullRenderer {
    #[must_use]
    pub fn with_surface(width: f64, height: f64) -> Self {
        Self {
            surface: Surface::new(width, height),
            ..Self::default()
        }
    }
}

impl Default for NullRenderer {
    fn default() -> Self {
        Self {
            surface: Surface::new(800.0, 400.0),
            frames_rendered: 0,
            last_rect_count: 0,
            last_line_count: 0,
            last_text_count: 0,
            last_frame: None,
        }
    }
}

impl Renderer for NullRenderer {
    fn surface(&self) -> Surface {
        self.surface
    }

    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        self.frames_rendered += 1;
        self.last_rect_count = frame.rects.len();
        self.last_line_count = frame.lines.len();
        self.last_text_count = frame.texts.len();
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
