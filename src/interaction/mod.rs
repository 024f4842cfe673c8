pub mod momentum;

use serde::{Deserialize, Serialize};

use crate::core::TimePrice;

pub use momentum::{MomentumConfig, MomentumPan};

/// What a primary-button drag does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Pan,
    /// Pointer input is forwarded as annotation drawing.
    Draw,
    /// Pointer input is forwarded as annotation erasing.
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Leave,
}

/// Result of routing one pointer event through the current mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    DragStart,
    Pan { delta_x: f64 },
    DragEnd,
    /// Draw/erase input resolved to chart coordinates for the host.
    Annotation {
        mode: InteractionMode,
        phase: PointerPhase,
        point: TimePrice,
    },
    Hover { x: f64, y: f64 },
    HoverCleared,
    Ignored,
}

/// Crosshair state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HoverState {
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    /// Series index of the bar nearest to the cursor.
    pub nearest_index: Option<usize>,
    pub time: Option<f64>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InteractionState {
    mode: InteractionMode,
    pressed: bool,
    last_x: f64,
    hover: HoverState,
}

impl InteractionState {
    #[must_use]
    pub fn mode(self) -> InteractionMode {
        self.mode
    }

    /// Switching modes abandons any gesture in progress.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        self.mode = mode;
        self.pressed = false;
    }

    #[must_use]
    pub fn is_pressed(self) -> bool {
        self.pressed
    }

    #[must_use]
    pub fn hover(self) -> HoverState {
        self.hover
    }

    pub fn set_hover(&mut self, hover: HoverState) {
        self.hover = hover;
    }

    pub fn clear_hover(&mut self) {
        self.hover = HoverState::default();
    }

    pub fn reset(&mut self) {
        self.pressed = false;
        self.last_x = 0.0;
        self.hover = HoverState::default();
    }
}

/// Routes a pointer event according to the interaction mode.
///
/// `resolve` maps a pixel position to chart coordinates; draw/erase events
/// that cannot be resolved are ignored.
pub fn dispatch_pointer(
    state: &mut InteractionState,
    phase: PointerPhase,
    x: f64,
    y: f64,
    resolve: impl Fn(f64, f64) -> Option<TimePrice>,
) -> PointerAction {
    if !x.is_finite() || !y.is_finite() {
        return PointerAction::Ignored;
    }

    match state.mode {
        InteractionMode::Pan => match phase {
            PointerPhase::Down => {
                state.pressed = true;
                state.last_x = x;
                PointerAction::DragStart
            }
            PointerPhase::Move if state.pressed => {
                let delta_x = x - state.last_x;
                state.last_x = x;
                PointerAction::Pan { delta_x }
            }
            PointerPhase::Move => PointerAction::Hover { x, y },
            PointerPhase::Up if state.pressed => {
                state.pressed = false;
                PointerAction::DragEnd
            }
            PointerPhase::Up => PointerAction::Ignored,
            PointerPhase::Leave if state.pressed => {
                state.pressed = false;
                PointerAction::DragEnd
            }
            PointerPhase::Leave => PointerAction::HoverCleared,
        },
        mode @ (InteractionMode::Draw | InteractionMode::Erase) => {
            let forward = match phase {
                PointerPhase::Down => {
                    state.pressed = true;
                    true
                }
                PointerPhase::Move => state.pressed,
                PointerPhase::Up => std::mem::replace(&mut state.pressed, false),
                PointerPhase::Leave => {
                    state.pressed = false;
                    return PointerAction::HoverCleared;
                }
            };
            if !forward {
                return if phase == PointerPhase::Move {
                    PointerAction::Hover { x, y }
                } else {
                    PointerAction::Ignored
                };
            }
            match resolve(x, y) {
                Some(point) => PointerAction::Annotation { mode, phase, point },
                None => PointerAction::Ignored,
            }
        }
    }
}
