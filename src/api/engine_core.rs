use std::time::Instant;

use indexmap::IndexMap;

use crate::animation::{ActiveCandleAnimator, PriceRangeAnimator, TimeSyncLine};
use crate::core::{CandleStore, LeftBoundaryEvent, ViewportController};
use crate::error::ChartResult;
use crate::extensions::{ChartPlugin, PriceMarker};
use crate::interaction::{InteractionState, MomentumPan};
use crate::render::{FrameLoopRegistry, RenderScheduler};

use super::ChartEngineConfig;

pub(super) type AuthoritativeClock = Box<dyn Fn() -> i64>;
pub(super) type LeftBoundaryCallback = Box<dyn FnMut(LeftBoundaryEvent)>;

/// Series data and the overlays anchored to it.
pub(super) struct ChartModel {
    pub(super) store: CandleStore,
    pub(super) price_markers: IndexMap<String, PriceMarker>,
}

/// What the user is looking at and how they got there.
pub(super) struct ChartView {
    pub(super) controller: ViewportController,
    /// Set once the first data positioned the window.
    pub(super) initialized: bool,
    pub(super) interaction: InteractionState,
    /// Auto-fit the price range to the visible bars.
    pub(super) follow_price: bool,
    /// Keep the newest bar in view as bars are appended.
    pub(super) follow_latest: bool,
}

/// Frame loops, scheduling and host hooks.
pub(super) struct ChartRuntime {
    pub(super) tail_animator: ActiveCandleAnimator,
    pub(super) price_range: PriceRangeAnimator,
    pub(super) momentum: MomentumPan,
    pub(super) time_sync: TimeSyncLine,
    pub(super) scheduler: RenderScheduler,
    pub(super) loops: FrameLoopRegistry,
    pub(super) clock: Option<AuthoritativeClock>,
    pub(super) on_left_boundary: Option<LeftBoundaryCallback>,
    pub(super) plugins: Vec<Box<dyn ChartPlugin>>,
    pub(super) last_now: Option<Instant>,
    pub(super) destroyed: bool,
}

/// Internal engine state behind the public facade.
pub(super) struct EngineCore {
    pub(super) config: ChartEngineConfig,
    pub(super) model: ChartModel,
    pub(super) view: ChartView,
    pub(super) runtime: ChartRuntime,
}

impl EngineCore {
    pub(super) fn new(config: ChartEngineConfig) -> ChartResult<Self> {
        let config = config.validate()?;
        Ok(Self {
            model: ChartModel {
                store: CandleStore::new(config.timeframe_interval_ms)?,
                price_markers: IndexMap::new(),
            },
            view: ChartView {
                controller: ViewportController::new(
                    config.viewport_limits(),
                    config.edge_trigger,
                    config.initial_bars_per_screen,
                )?,
                initialized: false,
                interaction: InteractionState::default(),
                follow_price: config.follow_price_default,
                follow_latest: true,
            },
            runtime: ChartRuntime {
                tail_animator: ActiveCandleAnimator::default(),
                price_range: PriceRangeAnimator::default(),
                momentum: MomentumPan::new(config.momentum_config())?,
                time_sync: TimeSyncLine::new(config.time_sync)?,
                scheduler: RenderScheduler::new(config.scheduler, !config.start_hidden)?,
                loops: FrameLoopRegistry::default(),
                clock: None,
                on_left_boundary: None,
                plugins: Vec::new(),
                last_now: None,
                destroyed: false,
            },
            config,
        })
    }

    pub(super) fn marker_prices(&self) -> Vec<f64> {
        self.model
            .price_markers
            .values()
            .map(|marker| marker.price)
            .collect()
    }
}
