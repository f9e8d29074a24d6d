//! Entity Kinematics
//!
//! Pure motion functions for players, bullets and balls. Every entity
//! carries the time at which its pose is valid, so an entity can be moved
//! to an arbitrary instant inside a frame (e.g. a collision) and later to
//! the end of the frame without double-counting.

use crate::core::vec2::Vec2;
use crate::game::field::{
    Time, PLAYER_ACCELERATION, PLAYER_DRAG, PLAYER_MAX_SPEED, PLAYER_RADIUS,
};
use crate::game::state::{Ball, Bullet, Player, ShotCharge};

/// An entity with a straight-line pose over time.
pub trait Kinematic: Sized {
    /// Position at `time()`.
    fn position(&self) -> Vec2;

    /// Effective velocity (units/ms).
    fn velocity(&self) -> Vec2;

    /// Time at which `position()` is valid.
    fn time(&self) -> Time;

    /// Replace the pose.
    fn with_pose(self, position: Vec2, time: Time) -> Self;

    /// Extrapolated position at `t`.
    #[inline]
    fn position_at(&self, t: Time) -> Vec2 {
        self.position().add(self.velocity().scale(t - self.time()))
    }
}

impl Kinematic for Player {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn time(&self) -> Time {
        self.time
    }

    fn with_pose(mut self, position: Vec2, time: Time) -> Self {
        self.position = position;
        self.time = time;
        self
    }
}

impl Kinematic for Bullet {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        Bullet::velocity(self)
    }

    fn time(&self) -> Time {
        self.time
    }

    fn with_pose(mut self, position: Vec2, time: Time) -> Self {
        self.position = position;
        self.time = time;
        self
    }
}

impl Kinematic for Ball {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn velocity(&self) -> Vec2 {
        self.effective_velocity()
    }

    fn time(&self) -> Time {
        self.time
    }

    fn with_pose(mut self, position: Vec2, time: Time) -> Self {
        self.position = position;
        self.time = time;
        self
    }
}

/// Move an entity forward to `time`.
///
/// An entity already at or past `time` is returned unchanged.
pub fn move_until<K: Kinematic>(time: Time, entity: K) -> K {
    if time <= entity.time() {
        return entity;
    }
    let position = entity.position_at(time);
    entity.with_pose(position, time)
}

/// Move an entity forward by `duration` ms.
pub fn advance<K: Kinematic>(duration: f64, entity: K) -> K {
    let target = entity.time() + duration;
    move_until(target, entity)
}

/// Apply one frame of input-driven acceleration.
///
/// Thrust accelerates along `direction`; coasting decays velocity.
/// Speed is capped. Position is untouched.
pub fn prepare_movement(duration: f64, thrusting: bool, direction: f64, mut player: Player) -> Player {
    player.direction = direction;
    player.thrusting = thrusting;

    let mut velocity = if thrusting {
        player
            .velocity
            .add(Vec2::from_angle(direction).scale(PLAYER_ACCELERATION * duration))
    } else {
        let keep = (1.0 - PLAYER_DRAG * duration).max(0.0);
        player.velocity.scale(keep)
    };

    if velocity.length_squared() > PLAYER_MAX_SPEED * PLAYER_MAX_SPEED {
        velocity = velocity.normalize().scale(PLAYER_MAX_SPEED);
    }

    player.velocity = velocity;
    player
}

/// Keep a player's circle inside a box.
///
/// The position is clamped, and any velocity component pushing into a wall
/// the player is touching is zeroed.
pub fn check_wall_obstacle(min_x: f64, max_x: f64, min_y: f64, max_y: f64, mut player: Player) -> Player {
    let lo_x = min_x + PLAYER_RADIUS;
    let hi_x = max_x - PLAYER_RADIUS;
    let lo_y = min_y + PLAYER_RADIUS;
    let hi_y = max_y - PLAYER_RADIUS;

    player.position = player.position.clamp_box(lo_x, hi_x, lo_y, hi_y);

    if (player.position.x <= lo_x && player.velocity.x < 0.0)
        || (player.position.x >= hi_x && player.velocity.x > 0.0)
    {
        player.velocity.x = 0.0;
    }
    if (player.position.y <= lo_y && player.velocity.y < 0.0)
        || (player.position.y >= hi_y && player.velocity.y > 0.0)
    {
        player.velocity.y = 0.0;
    }

    player
}

/// Outcome of a frame of shot charging.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotResult {
    /// Nothing fired
    NoShot,
    /// Key released after charging for `charge_ms`
    Shot {
        /// How long the key was held (ms)
        charge_ms: f64,
    },
}

/// Advance a player's shot charge.
///
/// Pressing starts a charge at `now`; releasing completes it.
pub fn update_shot(holding_shot_key: bool, now: Time, mut player: Player) -> (Player, ShotResult) {
    player.holding_shot = holding_shot_key;

    let result = match (player.charge, holding_shot_key) {
        (ShotCharge::Idle, true) => {
            player.charge = ShotCharge::Charging { since: now };
            ShotResult::NoShot
        }
        (ShotCharge::Charging { since }, false) => {
            player.charge = ShotCharge::Idle;
            ShotResult::Shot {
                charge_ms: (now - since).max(0.0),
            }
        }
        (ShotCharge::Charging { .. }, true) | (ShotCharge::Idle, false) => ShotResult::NoShot,
    };

    (player, result)
}
