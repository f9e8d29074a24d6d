//! Player Input
//!
//! Per-player control records and the per-frame input bundle handed to the
//! orchestrator. Device polling and key mapping live outside this crate.

use serde::{Serialize, Deserialize};

use crate::game::field::Time;
use crate::game::state::PlayerSlot;

/// Controls for one player for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// New facing direction (radians) while thrusting; None = coast and
    /// keep the previous direction
    pub direction: Option<f64>,

    /// Shot key currently held
    pub holding_shot: bool,
}

impl Controls {
    /// No thrust, shot key up.
    pub const fn idle() -> Self {
        Self {
            direction: None,
            holding_shot: false,
        }
    }

    /// Thrust toward `direction`.
    pub const fn thrust(direction: f64) -> Self {
        Self {
            direction: Some(direction),
            holding_shot: false,
        }
    }

    /// Same controls with the shot key held or released.
    pub const fn with_shot(mut self, holding: bool) -> Self {
        self.holding_shot = holding;
        self
    }

    /// Whether the player thrusts this frame.
    #[inline]
    pub fn is_thrusting(&self) -> bool {
        self.direction.is_some()
    }
}

/// Everything the orchestrator needs to advance one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    /// Wall-clock time the new frame represents (ms)
    pub frame_time: Time,

    /// Elapsed milliseconds since the previous frame
    pub duration_ms: f64,

    /// One record per player, indexed by `PlayerSlot::index()`
    pub controls: [Controls; 4],
}

impl FrameInput {
    /// Frame input with explicit controls.
    pub fn new(frame_time: Time, duration_ms: f64, controls: [Controls; 4]) -> Self {
        Self {
            frame_time,
            duration_ms,
            controls,
        }
    }

    /// Frame input with every player idle.
    pub fn idle(frame_time: Time, duration_ms: f64) -> Self {
        Self::new(frame_time, duration_ms, [Controls::idle(); 4])
    }

    /// Replace one player's controls.
    pub fn with(mut self, slot: PlayerSlot, controls: Controls) -> Self {
        self.controls[slot.index()] = controls;
        self
    }

    /// Controls for a slot.
    #[inline]
    pub fn controls_for(&self, slot: PlayerSlot) -> Controls {
        self.controls[slot.index()]
    }
}
