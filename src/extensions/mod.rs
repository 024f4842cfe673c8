//! Optional add-ons observing or decorating the chart.
//!
//! Extensions never reach into core state directly.

pub mod markers;
pub mod plugins;

pub use markers::{PriceMarker, index_price_markers};
pub use plugins::{ChartPlugin, PluginContext, PluginEvent};
