//! Field Geometry
//!
//! Static bounds, goal mouths, entity radii and spawn poses.
//! Origin is the bottom-left corner; +X right, +Y up; time is in milliseconds,
//! speeds in field units per millisecond.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::state::PlayerSlot;

/// Simulation time in milliseconds.
pub type Time = f64;

/// Field width in units.
pub const FIELD_WIDTH: f64 = 1200.0;

/// Field height in units.
pub const FIELD_HEIGHT: f64 = 700.0;

/// Field center point (ball entry spot).
pub const FIELD_CENTER: Vec2 = Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0);

/// Lower edge of both goal mouths (distance from the bottom wall).
pub const GOAL_BOTTOM: f64 = 250.0;

/// Upper edge of both goal mouths (distance from the bottom wall).
pub const GOAL_TOP: f64 = 450.0;

/// Player collision radius.
pub const PLAYER_RADIUS: f64 = 20.0;

/// Ball collision radius.
pub const BALL_RADIUS: f64 = 30.0;

/// Squared distance under which a ball obstructs the field center: (2r)².
pub const CENTER_CLEARANCE_SQ: f64 = 4.0 * BALL_RADIUS * BALL_RADIUS;

/// Thrust acceleration (units/ms²).
pub const PLAYER_ACCELERATION: f64 = 0.0008;

/// Velocity decay per millisecond while coasting.
pub const PLAYER_DRAG: f64 = 0.002;

/// Top player speed (units/ms).
pub const PLAYER_MAX_SPEED: f64 = 0.35;

/// Bullet travel speed (units/ms).
pub const BULLET_SPEED: f64 = 0.9;

/// One of the four field boundaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Wall {
    /// x = 0
    Left = 0,
    /// x = FIELD_WIDTH
    Right = 1,
    /// y = 0
    Bottom = 2,
    /// y = FIELD_HEIGHT
    Top = 3,
}

impl Wall {
    /// All walls in detection order.
    pub const ALL: [Wall; 4] = [Wall::Left, Wall::Right, Wall::Bottom, Wall::Top];
}

/// Whether a height lies inside the goal mouths on the left/right walls.
#[inline]
pub fn in_goal_mouth(y: f64) -> bool {
    (GOAL_BOTTOM..=GOAL_TOP).contains(&y)
}

/// Spawn pose (position, facing in radians) for a player slot.
///
/// Slots 1-2 defend the left goal and face right; slots 3-4 face left.
pub fn player_spawn(slot: PlayerSlot) -> (Vec2, f64) {
    match slot {
        PlayerSlot::P1 => (Vec2::new(300.0, 500.0), 0.0),
        PlayerSlot::P2 => (Vec2::new(300.0, 200.0), 0.0),
        PlayerSlot::P3 => (Vec2::new(900.0, 500.0), std::f64::consts::PI),
        PlayerSlot::P4 => (Vec2::new(900.0, 200.0), std::f64::consts::PI),
    }
}
