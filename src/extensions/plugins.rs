use serde::{Deserialize, Serialize};

use crate::core::{LeftBoundaryEvent, Viewport};
use crate::interaction::{HoverState, InteractionMode};

/// Read-only state passed to plugin hooks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PluginContext {
    pub viewport: Viewport,
    pub candles_len: usize,
    pub interval_ms: i64,
    pub interaction_mode: InteractionMode,
    pub hover: HoverState,
    pub follow_price: bool,
    pub time_sync_index: Option<f64>,
}

/// Events observable by plugins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PluginEvent {
    CandlesUpdated { candles_len: usize },
    HistoryPrepended { inserted: usize },
    TimeframeChanged { interval_ms: i64 },
    ViewportChanged { from_index: f64, to_index: f64 },
    ReachedLeftBoundary(LeftBoundaryEvent),
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    PanStarted,
    PanEnded,
    Rendered,
}

/// Extension hook for bounded custom logic.
///
/// Plugins observe events and read engine context; they never mutate
/// engine internals.
pub trait ChartPlugin {
    fn id(&self) -> &str;
    fn on_event(&mut self, event: PluginEvent, context: PluginContext);
}
