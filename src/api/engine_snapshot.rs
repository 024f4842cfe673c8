use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::primitives::unix_millis_to_datetime;
use crate::core::{CandleGeometry, Surface, Viewport, project_candles};
use crate::error::ChartResult;
use crate::extensions::PriceMarker;
use crate::interaction::{HoverState, InteractionMode};
use crate::render::Renderer;

use super::ChartEngine;

/// Serializable state snapshot used by regression tests and debugging
/// tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub viewport: Option<Viewport>,
    pub surface: Surface,
    pub candles_len: usize,
    pub interval_ms: i64,
    pub follow_price: bool,
    pub follow_latest: bool,
    pub interaction_mode: InteractionMode,
    pub hover: HoverState,
    pub time_sync_index: Option<f64>,
    pub candle_geometry: Vec<CandleGeometry>,
    pub price_markers: Vec<PriceMarker>,
    pub series_metadata: IndexMap<String, String>,
}

impl<R: Renderer> ChartEngine<R> {
    /// Captures the engine state with projected geometry for visible bars.
    pub fn snapshot(&self, body_width_px: f64) -> ChartResult<EngineSnapshot> {
        let surface = self.renderer.surface();
        let viewport = self.viewport();
        let candles = self.core.model.store.candles();

        let candle_geometry = match viewport {
            Some(viewport) => match viewport.visible_index_bounds(candles.len()) {
                Some((lo, hi)) => {
                    project_candles(&candles[lo..=hi], lo, &viewport, surface, body_width_px)?
                }
                None => Vec::new(),
            },
            None => Vec::new(),
        };

        let mut series_metadata = IndexMap::new();
        series_metadata.insert(
            "series_style".to_owned(),
            format!("{:?}", self.core.config.series_style),
        );
        series_metadata.insert(
            "tail_animating".to_owned(),
            self.core.runtime.tail_animator.is_animating().to_string(),
        );
        series_metadata.insert(
            "momentum_active".to_owned(),
            self.core.runtime.momentum.is_coasting().to_string(),
        );
        series_metadata.insert(
            "armed_loops".to_owned(),
            self.core.runtime.loops.len().to_string(),
        );
        if let Some(last) = candles.last() {
            series_metadata.insert("last_open_time".to_owned(), last.open_time.to_string());
            if let Some(utc) = unix_millis_to_datetime(last.open_time) {
                series_metadata.insert("last_open_time_utc".to_owned(), utc.to_rfc3339());
            }
        }

        Ok(EngineSnapshot {
            viewport,
            surface,
            candles_len: candles.len(),
            interval_ms: self.core.model.store.interval_ms(),
            follow_price: self.core.view.follow_price,
            follow_latest: self.core.view.follow_latest,
            interaction_mode: self.core.view.interaction.mode(),
            hover: self.core.view.interaction.hover(),
            time_sync_index: self.core.runtime.time_sync.displayed_index(),
            candle_geometry,
            price_markers: self.price_markers(),
            series_metadata,
        })
    }
}
