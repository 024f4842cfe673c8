pub mod candle;
pub mod candle_store;
pub mod coordinate;
pub mod primitives;
pub mod scale;
pub mod types;
pub mod viewport;
pub mod windowing;

pub use candle::{Candle, CandleGeometry, FeedCandle, project_candles};
pub use candle_store::{CandleStore, Placement, UpsertOutcome, canonicalize_candles};
pub use scale::LinearScale;
pub use types::{Surface, TimePrice};
pub use viewport::{
    EdgeTriggerPolicy, LeftBoundaryEvent, PriceRangeDecision, Viewport, ViewportController,
    ViewportLimits, padded_price_range,
};
