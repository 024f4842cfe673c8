mod data_controller;
mod engine;
mod engine_config;
mod engine_core;
mod engine_snapshot;
mod interaction_controller;
mod json_contract;
mod navigation_controller;
mod plugin_dispatch;
mod render_frame_builder;
mod render_style;

pub use engine::ChartEngine;
pub use engine_config::ChartEngineConfig;
pub use engine_snapshot::EngineSnapshot;
pub use json_contract::{ENGINE_SNAPSHOT_JSON_SCHEMA_V1, EngineSnapshotJsonContractV1};
pub use render_style::{RenderStyle, SeriesStyle};

pub use crate::core::{LeftBoundaryEvent, UpsertOutcome};
pub use crate::extensions::{ChartPlugin, PluginContext, PluginEvent, PriceMarker};
pub use crate::interaction::{InteractionMode, PointerAction};
