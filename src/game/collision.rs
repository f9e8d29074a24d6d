//! Collision Detection and Resolution
//!
//! Detection is continuous: each enabled category solves for the exact
//! sub-frame instant of first contact from relative position and velocity.
//! Resolution folds the time-sorted events over the game, one at a time.

use std::collections::BTreeSet;
use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::config::SimConfig;
use crate::game::events::{Collision, CollisionCategory, CollisionKind};
use crate::game::field::{
    in_goal_mouth, Time, Wall, BALL_RADIUS, FIELD_HEIGHT, FIELD_WIDTH, PLAYER_RADIUS,
};
use crate::game::kinematics::{move_until, Kinematic};
use crate::game::state::{BallId, BulletKey, Game, PlayerSlot};

// =============================================================================
// ENABLED CATEGORIES
// =============================================================================

/// Capability set of collision categories the detector evaluates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledCollisions(BTreeSet<CollisionCategory>);

impl Default for EnabledCollisions {
    /// Player-player, bullet-wall and bullet-ball.
    fn default() -> Self {
        Self::from_categories([
            CollisionCategory::PlayerPlayer,
            CollisionCategory::BulletWall,
            CollisionCategory::BulletBall,
        ])
    }
}

impl EnabledCollisions {
    /// Nothing enabled.
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Every category enabled.
    pub fn all() -> Self {
        Self::from_categories(CollisionCategory::ALL)
    }

    /// Exactly the given categories.
    pub fn from_categories(categories: impl IntoIterator<Item = CollisionCategory>) -> Self {
        Self(categories.into_iter().collect())
    }

    /// Same set plus `category`.
    pub fn with(mut self, category: CollisionCategory) -> Self {
        self.0.insert(category);
        self
    }

    /// Is `category` enabled?
    #[inline]
    pub fn contains(&self, category: CollisionCategory) -> bool {
        self.0.contains(&category)
    }
}

// =============================================================================
// CONTACT TIMES
// =============================================================================

/// Earliest time in `[0, horizon)` at which two moving circles touch.
///
/// `rel_pos` and `rel_vel` are the second circle relative to the first.
/// Circles already overlapping collide at 0 if they are closing, and never
/// if they are separating.
pub fn circle_contact_time(rel_pos: Vec2, rel_vel: Vec2, radius_sum: f64, horizon: f64) -> Option<f64> {
    let c = rel_pos.length_squared() - radius_sum * radius_sum;
    let half_b = rel_pos.dot(rel_vel);

    if c <= 0.0 {
        return (half_b < 0.0).then_some(0.0);
    }
    if half_b >= 0.0 {
        return None;
    }

    // half_b < 0 implies a > 0
    let a = rel_vel.length_squared();
    let disc = half_b * half_b - a * c;
    if disc < 0.0 {
        return None;
    }

    let t = (-half_b - disc.sqrt()) / a;
    (t < horizon).then_some(t)
}

/// Earliest time in `[0, horizon)` at which a circle of radius `inset`
/// reaches `wall`. Zero radius tests the center crossing the boundary.
pub fn wall_contact_time(position: Vec2, velocity: Vec2, inset: f64, wall: Wall, horizon: f64) -> Option<f64> {
    let (gap, closing) = match wall {
        Wall::Left => (position.x - inset, -velocity.x),
        Wall::Right => (FIELD_WIDTH - inset - position.x, velocity.x),
        Wall::Bottom => (position.y - inset, -velocity.y),
        Wall::Top => (FIELD_HEIGHT - inset - position.y, velocity.y),
    };

    if closing <= 0.0 {
        return None;
    }
    if gap <= 0.0 {
        return Some(0.0);
    }

    let t = gap / closing;
    (t < horizon).then_some(t)
}

// =============================================================================
// DETECTION
// =============================================================================

/// Immutable snapshot of an entity at the window start.
#[derive(Clone, Copy, Debug)]
struct Body<Id> {
    id: Id,
    position: Vec2,
    velocity: Vec2,
    radius: f64,
}

impl<Id: Copy> Body<Id> {
    fn of<K: Kinematic>(id: Id, entity: &K, radius: f64, at: Time) -> Self {
        Self {
            id,
            position: entity.position_at(at),
            velocity: entity.velocity(),
            radius,
        }
    }

    fn contact_with<Other>(&self, other: &Body<Other>, horizon: f64) -> Option<f64> {
        circle_contact_time(
            other.position.sub(self.position),
            other.velocity.sub(self.velocity),
            self.radius + other.radius,
            horizon,
        )
    }

    fn contact_with_wall(&self, wall: Wall, inset: f64, horizon: f64) -> Option<f64> {
        wall_contact_time(self.position, self.velocity, inset, wall, horizon)
    }
}

/// Every contact inside `[window_start, window_end)` for the enabled
/// categories.
///
/// Emission order: category (declaration order), then participants in
/// ascending identity, then walls left/right/bottom/top.
pub fn detect(window_start: Time, window_end: Time, game: &Game, enabled: &EnabledCollisions) -> Vec<Collision> {
    let mut events = Vec::new();
    let horizon = window_end - window_start;
    if horizon <= 0.0 {
        return events;
    }

    let players: Vec<Body<PlayerSlot>> = PlayerSlot::ALL
        .iter()
        .map(|&slot| Body::of(slot, game.player(slot), PLAYER_RADIUS, window_start))
        .collect();

    let bullets: Vec<Body<BulletKey>> = PlayerSlot::ALL
        .iter()
        .flat_map(|&owner| {
            game.bullets_of(owner).iter().map(move |(&id, bullet)| {
                Body::of(BulletKey { owner, id }, bullet, bullet.size.radius(), window_start)
            })
        })
        .collect();

    let balls: Vec<Body<BallId>> = game
        .balls_in_game()
        .map(|(id, ball)| Body::of(id, ball, BALL_RADIUS, window_start))
        .collect();

    let mut emit = |tau: f64, kind: CollisionKind| {
        events.push(Collision::new(window_start + tau, kind));
    };

    for category in CollisionCategory::ALL {
        if !enabled.contains(category) {
            continue;
        }
        match category {
            CollisionCategory::PlayerPlayer => {
                for (i, a) in players.iter().enumerate() {
                    for b in &players[i + 1..] {
                        if let Some(tau) = a.contact_with(b, horizon) {
                            emit(tau, CollisionKind::PlayerPlayer(a.id, b.id));
                        }
                    }
                }
            }
            CollisionCategory::PlayerWall => {
                for player in &players {
                    for wall in Wall::ALL {
                        if let Some(tau) = player.contact_with_wall(wall, player.radius, horizon) {
                            emit(tau, CollisionKind::PlayerWall(player.id, wall));
                        }
                    }
                }
            }
            CollisionCategory::PlayerBullet => {
                for player in &players {
                    // A player's own bullets never hit it
                    for bullet in bullets.iter().filter(|b| b.id.owner != player.id) {
                        if let Some(tau) = player.contact_with(bullet, horizon) {
                            emit(tau, CollisionKind::PlayerBullet(player.id, bullet.id));
                        }
                    }
                }
            }
            CollisionCategory::PlayerBall => {
                for player in &players {
                    for ball in &balls {
                        if let Some(tau) = player.contact_with(ball, horizon) {
                            emit(tau, CollisionKind::PlayerBall(player.id, ball.id));
                        }
                    }
                }
            }
            CollisionCategory::BulletBullet => {
                for (i, a) in bullets.iter().enumerate() {
                    for b in &bullets[i + 1..] {
                        if let Some(tau) = a.contact_with(b, horizon) {
                            emit(tau, CollisionKind::BulletBullet(a.id, b.id));
                        }
                    }
                }
            }
            CollisionCategory::BulletBall => {
                for bullet in &bullets {
                    for ball in &balls {
                        if let Some(tau) = bullet.contact_with(ball, horizon) {
                            emit(tau, CollisionKind::BulletBall(bullet.id, ball.id));
                        }
                    }
                }
            }
            CollisionCategory::BulletWall => {
                for bullet in &bullets {
                    for wall in Wall::ALL {
                        // Center crossing: the bullet has left the field
                        if let Some(tau) = bullet.contact_with_wall(wall, 0.0, horizon) {
                            emit(tau, CollisionKind::BulletWall(bullet.id, wall));
                        }
                    }
                }
            }
            CollisionCategory::BallBall => {
                for (i, a) in balls.iter().enumerate() {
                    for b in &balls[i + 1..] {
                        if let Some(tau) = a.contact_with(b, horizon) {
                            emit(tau, CollisionKind::BallBall(a.id, b.id));
                        }
                    }
                }
            }
            CollisionCategory::BallWall => {
                for ball in &balls {
                    for wall in Wall::ALL {
                        let Some(tau) = ball.contact_with_wall(wall, ball.radius, horizon) else {
                            continue;
                        };
                        let y = ball.position.y + ball.velocity.y * tau;
                        if matches!(wall, Wall::Left | Wall::Right) && in_goal_mouth(y) {
                            continue;
                        }
                        emit(tau, CollisionKind::BallWall(ball.id, wall));
                    }
                }
            }
        }
    }

    events
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// A resolved event and whether it changed the game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// The event
    pub collision: Collision,
    /// False for reserved categories and for events whose bullet or ball
    /// was already removed earlier in the fold
    pub applied: bool,
}

/// Sort events by time and apply them in order.
///
/// Ties at the same instant resolve by category, then by detector emission
/// order (stable sort). Returns the events in the order they were applied.
pub fn resolve(mut events: Vec<Collision>, game: &mut Game, config: &SimConfig) -> Vec<Resolution> {
    events.sort_by(Collision::resolution_order);

    events
        .into_iter()
        .map(|collision| Resolution {
            collision,
            applied: apply(&collision, game, config.ball_impulse),
        })
        .collect()
}

/// Apply one event. Returns whether anything changed.
fn apply(collision: &Collision, game: &mut Game, ball_impulse: f64) -> bool {
    match collision.kind {
        CollisionKind::BulletWall(key, _) => game.bullets[key.owner.index()].remove(&key.id).is_some(),
        CollisionKind::BulletBall(key, ball_id) => {
            bullet_hits_ball(game, key, ball_id, collision.time, ball_impulse)
        }
        // Reserved categories
        CollisionKind::PlayerPlayer(..)
        | CollisionKind::PlayerWall(..)
        | CollisionKind::PlayerBullet(..)
        | CollisionKind::PlayerBall(..)
        | CollisionKind::BulletBullet(..)
        | CollisionKind::BallBall(..)
        | CollisionKind::BallWall(..) => false,
    }
}

/// Remove the bullet and push the ball along the bullet's direction,
/// after moving the ball to the contact instant.
fn bullet_hits_ball(game: &mut Game, key: BulletKey, ball_id: BallId, time: Time, ball_impulse: f64) -> bool {
    if !game.balls.in_game.contains_key(&ball_id) {
        return false;
    }
    let Some(bullet) = game.bullets[key.owner.index()].remove(&key.id) else {
        return false;
    };
    let Some(ball) = game.balls.in_game.get_mut(&ball_id) else {
        return false;
    };

    let mut moved = move_until(time, ball.clone());
    moved.velocity = moved
        .velocity
        .add(Vec2::from_angle(bullet.direction).scale(ball_impulse));
    *ball = moved;
    true
}

// =============================================================================
// TESTS
// =============================================================================
