use serde::{Deserialize, Serialize};

use crate::animation::TimeSyncConfig;
use crate::core::{EdgeTriggerPolicy, ViewportLimits};
use crate::error::{ChartError, ChartResult};
use crate::interaction::MomentumConfig;
use crate::render::SchedulerConfig;

use super::{RenderStyle, SeriesStyle};

/// Public engine bootstrap configuration.
///
/// Serializable so hosts can persist chart setup; every field has a default,
/// so `{}` is a valid config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartEngineConfig {
    #[serde(default = "default_timeframe_interval_ms")]
    pub timeframe_interval_ms: i64,
    #[serde(default = "default_overshoot_ratio")]
    pub overshoot_ratio: f64,
    #[serde(default = "default_min_bars_per_screen")]
    pub min_bars_per_screen: f64,
    #[serde(default = "default_max_bars_per_screen")]
    pub max_bars_per_screen: f64,
    #[serde(default = "default_initial_bars_per_screen")]
    pub initial_bars_per_screen: f64,
    #[serde(default = "default_right_margin_bars")]
    pub right_margin_bars: f64,
    /// Overrides `momentum.friction`.
    #[serde(default = "default_friction_coefficient")]
    pub friction_coefficient: f64,
    #[serde(default = "default_true")]
    pub follow_price_default: bool,
    #[serde(default = "default_price_padding_ratio")]
    pub price_padding_ratio: f64,
    #[serde(default = "default_true")]
    pub animate_tail_updates: bool,
    /// Construct the scheduler hidden; the first reveal settles longer.
    #[serde(default)]
    pub start_hidden: bool,
    #[serde(default)]
    pub series_style: SeriesStyle,
    #[serde(default)]
    pub render_style: RenderStyle,
    #[serde(default)]
    pub momentum: MomentumConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub edge_trigger: EdgeTriggerPolicy,
    #[serde(default)]
    pub time_sync: TimeSyncConfig,
}

fn default_timeframe_interval_ms() -> i64 {
    60_000
}

fn default_overshoot_ratio() -> f64 {
    ViewportLimits::default().overshoot_ratio
}

fn default_min_bars_per_screen() -> f64 {
    ViewportLimits::default().min_bars_per_screen
}

fn default_max_bars_per_screen() -> f64 {
    ViewportLimits::default().max_bars_per_screen
}

fn default_initial_bars_per_screen() -> f64 {
    100.0
}

fn default_right_margin_bars() -> f64 {
    ViewportLimits::default().right_margin_bars
}

fn default_friction_coefficient() -> f64 {
    MomentumConfig::default().friction
}

fn default_price_padding_ratio() -> f64 {
    ViewportLimits::default().price_padding_ratio
}

fn default_true() -> bool {
    true
}

impl Default for ChartEngineConfig {
    fn default() -> Self {
        Self {
            timeframe_interval_ms: default_timeframe_interval_ms(),
            overshoot_ratio: default_overshoot_ratio(),
            min_bars_per_screen: default_min_bars_per_screen(),
            max_bars_per_screen: default_max_bars_per_screen(),
            initial_bars_per_screen: default_initial_bars_per_screen(),
            right_margin_bars: default_right_margin_bars(),
            friction_coefficient: default_friction_coefficient(),
            follow_price_default: true,
            price_padding_ratio: default_price_padding_ratio(),
            animate_tail_updates: true,
            start_hidden: false,
            series_style: SeriesStyle::default(),
            render_style: RenderStyle::default(),
            momentum: MomentumConfig::default(),
            scheduler: SchedulerConfig::default(),
            edge_trigger: EdgeTriggerPolicy::default(),
            time_sync: TimeSyncConfig::default(),
        }
    }
}

impl ChartEngineConfig {
    #[must_use]
    pub fn new(timeframe_interval_ms: i64) -> Self {
        Self {
            timeframe_interval_ms,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bars_per_screen(mut self, min: f64, max: f64, initial: f64) -> Self {
        self.min_bars_per_screen = min;
        self.max_bars_per_screen = max;
        self.initial_bars_per_screen = initial;
        self
    }

    #[must_use]
    pub fn with_overshoot_ratio(mut self, overshoot_ratio: f64) -> Self {
        self.overshoot_ratio = overshoot_ratio;
        self
    }

    #[must_use]
    pub fn with_right_margin_bars(mut self, right_margin_bars: f64) -> Self {
        self.right_margin_bars = right_margin_bars;
        self
    }

    #[must_use]
    pub fn with_friction_coefficient(mut self, friction_coefficient: f64) -> Self {
        self.friction_coefficient = friction_coefficient;
        self
    }

    #[must_use]
    pub fn with_follow_price_default(mut self, follow: bool) -> Self {
        self.follow_price_default = follow;
        self
    }

    #[must_use]
    pub fn with_price_padding_ratio(mut self, ratio: f64) -> Self {
        self.price_padding_ratio = ratio;
        self
    }

    #[must_use]
    pub fn with_animate_tail_updates(mut self, animate: bool) -> Self {
        self.animate_tail_updates = animate;
        self
    }

    #[must_use]
    pub fn with_start_hidden(mut self, hidden: bool) -> Self {
        self.start_hidden = hidden;
        self
    }

    #[must_use]
    pub fn with_series_style(mut self, style: SeriesStyle) -> Self {
        self.series_style = style;
        self
    }

    #[must_use]
    pub fn with_render_style(mut self, style: RenderStyle) -> Self {
        self.render_style = style;
        self
    }

    #[must_use]
    pub fn with_momentum(mut self, momentum: MomentumConfig) -> Self {
        self.momentum = momentum;
        self
    }

    #[must_use]
    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    #[must_use]
    pub fn with_edge_trigger(mut self, policy: EdgeTriggerPolicy) -> Self {
        self.edge_trigger = policy;
        self
    }

    #[must_use]
    pub fn with_time_sync(mut self, time_sync: TimeSyncConfig) -> Self {
        self.time_sync = time_sync;
        self
    }

    #[must_use]
    pub fn viewport_limits(&self) -> ViewportLimits {
        ViewportLimits {
            min_bars_per_screen: self.min_bars_per_screen,
            max_bars_per_screen: self.max_bars_per_screen,
            overshoot_ratio: self.overshoot_ratio,
            right_margin_bars: self.right_margin_bars,
            price_padding_ratio: self.price_padding_ratio,
        }
    }

    #[must_use]
    pub fn momentum_config(&self) -> MomentumConfig {
        self.momentum.with_friction(self.friction_coefficient)
    }

    pub fn validate(self) -> ChartResult<Self> {
        if self.timeframe_interval_ms <= 0 {
            return Err(ChartError::InvalidData(
                "timeframe interval must be > 0".to_owned(),
            ));
        }
        if !self.initial_bars_per_screen.is_finite() || self.initial_bars_per_screen <= 0.0 {
            return Err(ChartError::InvalidData(
                "initial bars per screen must be finite and > 0".to_owned(),
            ));
        }
        self.viewport_limits().validate()?;
        self.momentum_config().validate()?;
        self.scheduler.validate()?;
        self.edge_trigger.validate()?;
        self.time_sync.validate()?;
        self.render_style.validate()?;
        Ok(self)
    }

    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config: {e}")))
    }
}
