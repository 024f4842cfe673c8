use std::time::Instant;

use tracing::{debug, warn};

use crate::core::coordinate::{pixel_to_time_price, pixel_x_to_index, pixel_y_to_price};
use crate::interaction::{
    HoverState, InteractionMode, PointerAction, PointerPhase, dispatch_pointer,
};
use crate::render::{FrameLoopKind, Renderer};

use super::{ChartEngine, PluginEvent};

impl<R: Renderer> ChartEngine<R> {
    pub fn set_interaction_mode(&mut self, mode: InteractionMode) {
        if self.reject_if_destroyed("set_interaction_mode") {
            return;
        }
        if self.core.runtime.momentum.is_dragging() {
            self.cancel_momentum();
        }
        self.core.view.interaction.set_mode(mode);
        debug!(?mode, "interaction mode");
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, now: Instant) -> PointerAction {
        self.handle_pointer(PointerPhase::Down, x, y, now)
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, now: Instant) -> PointerAction {
        self.handle_pointer(PointerPhase::Move, x, y, now)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, now: Instant) -> PointerAction {
        self.handle_pointer(PointerPhase::Up, x, y, now)
    }

    pub fn pointer_leave(&mut self, now: Instant) -> PointerAction {
        let (x, y) = {
            let hover = self.core.view.interaction.hover();
            (hover.x, hover.y)
        };
        self.handle_pointer(PointerPhase::Leave, x, y, now)
    }

    fn handle_pointer(
        &mut self,
        phase: PointerPhase,
        x: f64,
        y: f64,
        now: Instant,
    ) -> PointerAction {
        if self.reject_if_destroyed("pointer") {
            return PointerAction::Ignored;
        }
        self.core.runtime.last_now = Some(now);
        let surface = self.renderer.surface();
        let viewport = self.core.view.controller.viewport();
        let initialized = self.core.view.initialized;
        let candles = self.core.model.store.candles();
        let interval_ms = self.core.model.store.interval_ms();

        let action = dispatch_pointer(&mut self.core.view.interaction, phase, x, y, |px, py| {
            if !initialized {
                return None;
            }
            pixel_to_time_price(&viewport, surface, candles, interval_ms, px, py)
        });

        match action {
            PointerAction::DragStart => {
                self.core.runtime.momentum.begin_drag();
                self.core.runtime.loops.disarm(FrameLoopKind::Momentum);
                self.emit_plugin_event(PluginEvent::PanStarted);
            }
            PointerAction::Pan { delta_x } => {
                self.core.runtime.momentum.record(now, delta_x);
                if let Err(err) = self.core.view.controller.pan(delta_x, surface.width) {
                    warn!(error = %err, "pan ignored");
                    return PointerAction::Ignored;
                }
                self.core.view.follow_latest = false;
                self.after_view_change(now);
            }
            PointerAction::DragEnd => {
                if self.core.runtime.momentum.release(now, surface.width) {
                    self.core.runtime.loops.arm(FrameLoopKind::Momentum, now);
                }
                self.emit_plugin_event(PluginEvent::PanEnded);
                if phase == PointerPhase::Leave {
                    self.core.view.interaction.clear_hover();
                    self.emit_plugin_event(PluginEvent::PointerLeft);
                }
                self.core.runtime.scheduler.schedule(now);
            }
            PointerAction::Hover { x, y } => {
                self.update_hover(x, y);
                self.emit_plugin_event(PluginEvent::PointerMoved { x, y });
                self.core.runtime.scheduler.schedule(now);
            }
            PointerAction::HoverCleared => {
                self.core.view.interaction.clear_hover();
                self.emit_plugin_event(PluginEvent::PointerLeft);
                self.core.runtime.scheduler.schedule(now);
            }
            PointerAction::Annotation { .. } => {
                self.update_hover(x, y);
                self.core.runtime.scheduler.schedule(now);
            }
            PointerAction::Ignored => {}
        }
        action
    }

    /// Records the cursor and snaps to the nearest bar.
    fn update_hover(&mut self, x: f64, y: f64) {
        let surface = self.renderer.surface();
        let viewport = self.core.view.controller.viewport();
        let store = &self.core.model.store;

        let nearest_index = if self.core.view.initialized && !store.is_empty() {
            let index = pixel_x_to_index(&viewport, surface, x).round();
            let last = (store.len() - 1) as f64;
            index.is_finite().then(|| index.clamp(0.0, last) as usize)
        } else {
            None
        };

        self.core.view.interaction.set_hover(HoverState {
            visible: true,
            x,
            y,
            nearest_index,
            time: nearest_index
                .and_then(|index| store.get(index))
                .map(|candle| candle.open_time as f64),
            price: pixel_y_to_price(&viewport, surface, y),
        });
    }
}
