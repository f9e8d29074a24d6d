//! Collision Events
//!
//! Contacts found by the detector inside one frame window. Events are
//! produced and consumed within a single update and never stored.

use std::cmp::Ordering;
use serde::{Serialize, Deserialize};

use crate::game::field::{Time, Wall};
use crate::game::state::{BallId, BulletKey, PlayerSlot};

/// Category of a collision, by the kinds of entity involved.
///
/// Declaration order is detection order and the tie-break between events
/// at the same instant. Lower value = resolved first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CollisionCategory {
    /// Two players
    PlayerPlayer = 0,
    /// A player and a field boundary
    PlayerWall = 1,
    /// A player and another player's bullet
    PlayerBullet = 2,
    /// A player and a ball
    PlayerBall = 3,
    /// Two bullets
    BulletBullet = 4,
    /// A bullet and a ball
    BulletBall = 5,
    /// A bullet leaving the field
    BulletWall = 6,
    /// Two balls
    BallBall = 7,
    /// A ball and a field boundary (goal mouths are open)
    BallWall = 8,
}

impl CollisionCategory {
    /// Every category, in detection order.
    pub const ALL: [CollisionCategory; 9] = [
        CollisionCategory::PlayerPlayer,
        CollisionCategory::PlayerWall,
        CollisionCategory::PlayerBullet,
        CollisionCategory::PlayerBall,
        CollisionCategory::BulletBullet,
        CollisionCategory::BulletBall,
        CollisionCategory::BulletWall,
        CollisionCategory::BallBall,
        CollisionCategory::BallWall,
    ];
}

/// Participants of a collision, by stable identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionKind {
    /// Two players (lower slot first)
    PlayerPlayer(PlayerSlot, PlayerSlot),
    /// Player touching a wall
    PlayerWall(PlayerSlot, Wall),
    /// Player hit by a bullet
    PlayerBullet(PlayerSlot, BulletKey),
    /// Player touching a ball
    PlayerBall(PlayerSlot, BallId),
    /// Two bullets (lower key first)
    BulletBullet(BulletKey, BulletKey),
    /// Bullet hitting a ball
    BulletBall(BulletKey, BallId),
    /// Bullet crossing a field boundary
    BulletWall(BulletKey, Wall),
    /// Two balls (lower id first)
    BallBall(BallId, BallId),
    /// Ball touching a wall
    BallWall(BallId, Wall),
}

impl CollisionKind {
    /// Category of this kind.
    pub fn category(&self) -> CollisionCategory {
        match self {
            CollisionKind::PlayerPlayer(..) => CollisionCategory::PlayerPlayer,
            CollisionKind::PlayerWall(..) => CollisionCategory::PlayerWall,
            CollisionKind::PlayerBullet(..) => CollisionCategory::PlayerBullet,
            CollisionKind::PlayerBall(..) => CollisionCategory::PlayerBall,
            CollisionKind::BulletBullet(..) => CollisionCategory::BulletBullet,
            CollisionKind::BulletBall(..) => CollisionCategory::BulletBall,
            CollisionKind::BulletWall(..) => CollisionCategory::BulletWall,
            CollisionKind::BallBall(..) => CollisionCategory::BallBall,
            CollisionKind::BallWall(..) => CollisionCategory::BallWall,
        }
    }
}

/// A contact at a fractional instant inside the frame window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Absolute contact time (ms)
    pub time: Time,

    /// Who collided
    pub kind: CollisionKind,
}

impl Collision {
    /// Create a new event.
    pub fn new(time: Time, kind: CollisionKind) -> Self {
        Self { time, kind }
    }

    /// Category of this event.
    #[inline]
    pub fn category(&self) -> CollisionCategory {
        self.kind.category()
    }

    /// Resolution order: time, then category.
    ///
    /// Events equal under this order keep detector emission order when
    /// sorted with a stable sort.
    pub fn resolution_order(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.category().cmp(&other.category()))
    }
}
