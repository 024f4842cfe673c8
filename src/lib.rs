//! live-chart: viewport and animation engine for live financial charts.
//!
//! The crate turns a streaming candle feed plus pointer input into
//! backend-agnostic render frames. It owns the coordinate transforms, the
//! mutable "live candle" series, eased tail and price-range animation,
//! inertial panning, and a "now" marker synchronized to an external clock.
//! Drawing is delegated to a [`render::Renderer`] implementation.

pub mod animation;
pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
