//! Simulation Configuration

use serde::{Serialize, Deserialize};

use crate::game::balls::BALL_ADMISSION_DELAY_MS;
use crate::game::collision::EnabledCollisions;

/// Default speed added to a ball by a bullet hit (units/ms).
pub const BALL_IMPULSE: f64 = 0.25;

/// Tunables for one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Collision categories the detector evaluates
    pub enabled: EnabledCollisions,

    /// Velocity added to a ball along the bullet's direction on impact.
    /// Independent of bullet size.
    pub ball_impulse: f64,

    /// How long the entry timer must run before a ball is admitted (ms)
    pub admission_delay_ms: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            enabled: EnabledCollisions::default(),
            ball_impulse: BALL_IMPULSE,
            admission_delay_ms: BALL_ADMISSION_DELAY_MS,
        }
    }
}

impl SimConfig {
    /// Same config with a different collision capability set.
    pub fn with_collisions(mut self, enabled: EnabledCollisions) -> Self {
        self.enabled = enabled;
        self
    }
}
