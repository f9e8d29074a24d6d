//! Game State Definitions
//!
//! All state types for the arena simulation.
//! Uses BTreeMap for deterministic iteration order.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::core::hash::{StateHash, compute_state_hash};
use crate::game::balls::{Balls, BallTimer};
use crate::game::field::{player_spawn, Time, BULLET_SPEED};

// =============================================================================
// IDENTITIES
// =============================================================================

/// One of the four fixed player slots.
///
/// Implements Ord so slot order is the canonical iteration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum PlayerSlot {
    /// Slot 1 (left team)
    P1 = 0,
    /// Slot 2 (left team)
    P2 = 1,
    /// Slot 3 (right team)
    P3 = 2,
    /// Slot 4 (right team)
    P4 = 3,
}

impl PlayerSlot {
    /// All slots in canonical order.
    pub const ALL: [PlayerSlot; 4] = [PlayerSlot::P1, PlayerSlot::P2, PlayerSlot::P3, PlayerSlot::P4];

    /// Array index (0-3).
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-facing slot number (1-4).
    #[inline]
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}

/// Bullet identifier: the frame id at which the bullet was spawned.
/// Unique only within its owner's mapping.
pub type BulletId = u64;

/// Ball identifier, unique for the lifetime of a match.
pub type BallId = u32;

/// Stable identity of a bullet across detection and resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BulletKey {
    /// Owning player
    pub owner: PlayerSlot,
    /// Id within the owner's mapping
    pub id: BulletId,
}

// =============================================================================
// PLAYER
// =============================================================================

/// Shot charge state.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ShotCharge {
    /// Shot key not held
    #[default]
    Idle,
    /// Shot key held since the given time
    Charging {
        /// Time the key was pressed
        since: Time,
    },
}

/// State of a single player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Position in the field
    pub position: Vec2,

    /// Velocity (units/ms)
    pub velocity: Vec2,

    /// Facing direction in radians
    pub direction: f64,

    /// Thrusting this frame?
    pub thrusting: bool,

    /// Shot key held this frame?
    pub holding_shot: bool,

    /// Shot charge progress
    pub charge: ShotCharge,

    /// Time at which `position` is valid
    pub time: Time,
}

impl Player {
    /// Create a player at its slot's spawn pose.
    pub fn spawn(slot: PlayerSlot, time: Time) -> Self {
        let (position, direction) = player_spawn(slot);
        Self {
            position,
            velocity: Vec2::ZERO,
            direction,
            thrusting: false,
            holding_shot: false,
            charge: ShotCharge::Idle,
            time,
        }
    }
}

// =============================================================================
// BULLET
// =============================================================================

/// Bullet size class, chosen by how long the shot was charged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BulletSize {
    /// Charged under 250 ms
    Small = 0,
    /// Charged under 750 ms
    Medium = 1,
    /// Charged 750 ms or longer
    Large = 2,
}

impl BulletSize {
    /// Size class for a charge duration.
    pub fn from_charge(charge_ms: f64) -> Self {
        if charge_ms < 250.0 {
            BulletSize::Small
        } else if charge_ms < 750.0 {
            BulletSize::Medium
        } else {
            BulletSize::Large
        }
    }

    /// Collision radius.
    #[inline]
    pub fn radius(self) -> f64 {
        match self {
            BulletSize::Small => 4.0,
            BulletSize::Medium => 7.0,
            BulletSize::Large => 11.0,
        }
    }
}

/// A bullet in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Position in the field
    pub position: Vec2,

    /// Travel direction in radians
    pub direction: f64,

    /// Size class
    pub size: BulletSize,

    /// Time at which `position` is valid
    pub time: Time,
}

impl Bullet {
    /// Create a bullet at a spawn pose.
    pub fn new(position: Vec2, direction: f64, size: BulletSize, time: Time) -> Self {
        Self { position, direction, size, time }
    }

    /// Velocity (constant speed along `direction`).
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.direction).scale(BULLET_SPEED)
    }
}

// =============================================================================
// BALL
// =============================================================================

/// Superspeed modifier: scales a ball's effective velocity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Superspeed {
    /// Velocity multiplier
    pub factor: f64,
}

/// A ball on the field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Position in the field
    pub position: Vec2,

    /// Base velocity (units/ms)
    pub velocity: Vec2,

    /// Optional speed modifier
    pub superspeed: Option<Superspeed>,

    /// Time at which `position` is valid
    pub time: Time,
}

impl Ball {
    /// A resting ball at a position.
    pub fn at_rest(position: Vec2, time: Time) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            superspeed: None,
            time,
        }
    }

    /// Velocity with the superspeed modifier applied.
    #[inline]
    pub fn effective_velocity(&self) -> Vec2 {
        match self.superspeed {
            Some(Superspeed { factor }) => self.velocity.scale(factor),
            None => self.velocity,
        }
    }
}

// =============================================================================
// GAME
// =============================================================================

/// Authoritative snapshot for one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Time the match started
    pub start_time: Time,

    /// Time this snapshot represents
    pub frame_time: Time,

    /// Frame counter, +1 per update
    pub frame_id: u64,

    /// Team scores (left, right)
    pub score: [u32; 2],

    /// Players indexed by `PlayerSlot::index()`
    pub players: [Player; 4],

    /// Per-player bullet mappings, indexed by owner slot
    pub bullets: [BTreeMap<BulletId, Bullet>; 4],

    /// Ball lifecycle aggregate
    pub balls: Balls,
}

impl Game {
    /// Initial state: four players at their spawns, zero score, no bullets,
    /// three balls queued for entry.
    pub fn init(start_time: Time) -> Self {
        Self {
            start_time,
            frame_time: start_time,
            frame_id: 0,
            score: [0, 0],
            players: PlayerSlot::ALL.map(|slot| Player::spawn(slot, start_time)),
            bullets: Default::default(),
            balls: Balls::initial(start_time),
        }
    }

    /// Get a player by slot.
    #[inline]
    pub fn player(&self, slot: PlayerSlot) -> &Player {
        &self.players[slot.index()]
    }

    /// Get a player mutably by slot.
    #[inline]
    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut Player {
        &mut self.players[slot.index()]
    }

    /// Bullets owned by a slot.
    #[inline]
    pub fn bullets_of(&self, slot: PlayerSlot) -> &BTreeMap<BulletId, Bullet> {
        &self.bullets[slot.index()]
    }

    /// Look up a bullet by stable identity.
    pub fn bullet(&self, key: BulletKey) -> Option<&Bullet> {
        self.bullets[key.owner.index()].get(&key.id)
    }

    /// All four players, in slot order.
    pub fn players(&self) -> &[Player; 4] {
        &self.players
    }

    /// All four bullet mappings, in slot order.
    pub fn bullets(&self) -> &[BTreeMap<BulletId, Bullet>; 4] {
        &self.bullets
    }

    /// Balls currently on the field, in id order.
    pub fn balls_in_game(&self) -> impl Iterator<Item = (BallId, &Ball)> {
        self.balls.in_game.iter().map(|(id, ball)| (*id, ball))
    }

    /// Ball ids waiting to enter, head first.
    pub fn incoming(&self) -> impl Iterator<Item = BallId> + '_ {
        self.balls.incoming.iter().copied()
    }

    /// Current ball entry timer.
    pub fn timer(&self) -> BallTimer {
        self.balls.timer
    }

    /// Team scores.
    pub fn score(&self) -> [u32; 2] {
        self.score
    }

    /// Current frame id.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Current frame time.
    pub fn frame_time(&self) -> Time {
        self.frame_time
    }

    /// Total number of live bullets.
    pub fn bullet_count(&self) -> usize {
        self.bullets.iter().map(BTreeMap::len).sum()
    }

    /// Compute hash of current state.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.frame_id, self.frame_time, |hasher| {
            hasher.update_f64(self.start_time);
            hasher.update_u32(self.score[0]);
            hasher.update_u32(self.score[1]);

            for player in &self.players {
                hasher.update_vec2(player.position);
                hasher.update_vec2(player.velocity);
                hasher.update_f64(player.direction);
                hasher.update_f64(player.time);
                hasher.update_bool(player.thrusting);
                hasher.update_bool(player.holding_shot);
                match player.charge {
                    ShotCharge::Idle => hasher.update_u8(0),
                    ShotCharge::Charging { since } => {
                        hasher.update_u8(1);
                        hasher.update_f64(since);
                    }
                }
            }

            // BTreeMap guarantees sorted order
            for (slot, bullets) in self.bullets.iter().enumerate() {
                hasher.update_u8(slot as u8);
                for (id, bullet) in bullets {
                    hasher.update_u64(*id);
                    hasher.update_vec2(bullet.position);
                    hasher.update_f64(bullet.direction);
                    hasher.update_u8(bullet.size as u8);
                    hasher.update_f64(bullet.time);
                }
            }

            for (id, ball) in &self.balls.in_game {
                hasher.update_u32(*id);
                hasher.update_vec2(ball.position);
                hasher.update_vec2(ball.velocity);
                hasher.update_f64(ball.time);
                match ball.superspeed {
                    None => hasher.update_u8(0),
                    Some(Superspeed { factor }) => {
                        hasher.update_u8(1);
                        hasher.update_f64(factor);
                    }
                }
            }
            for id in &self.balls.incoming {
                hasher.update_u32(*id);
            }
            match self.balls.timer {
                BallTimer::WaitingForFreeSpace => hasher.update_u8(0),
                BallTimer::FreeSince(t) => {
                    hasher.update_u8(1);
                    hasher.update_f64(t);
                }
            }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
