//! Ball Lifecycle
//!
//! Balls wait in an entry queue and are admitted one at a time at the field
//! center. The entry timer arms only while the center is clear, and an
//! armed timer must run for the admission delay before the head of the
//! queue is placed.

use std::collections::{BTreeMap, VecDeque};
use serde::{Serialize, Deserialize};

use crate::game::field::{Time, CENTER_CLEARANCE_SQ, FIELD_CENTER};
use crate::game::state::{Ball, BallId};

/// Ball ids queued at match start.
pub const INITIAL_BALL_IDS: [BallId; 3] = [0, 1, 2];

/// Default delay between the timer arming and a ball entering (ms).
pub const BALL_ADMISSION_DELAY_MS: f64 = 2000.0;

/// Entry timer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BallTimer {
    /// No countdown running
    WaitingForFreeSpace,
    /// Countdown armed at the given time
    FreeSince(Time),
}

/// Balls on the field plus the entry queue and its timer.
///
/// Ids in `incoming` never appear in `in_game`, and an id is never reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Balls {
    /// Balls being simulated (BTreeMap for deterministic iteration)
    pub in_game: BTreeMap<BallId, Ball>,

    /// Ids waiting to enter, head first
    pub incoming: VecDeque<BallId>,

    /// Entry timer
    pub timer: BallTimer,
}

impl Balls {
    /// Queue the initial ball pool, with the timer armed at `start_time`.
    pub fn initial(start_time: Time) -> Self {
        Self::queued(INITIAL_BALL_IDS, start_time)
    }

    /// Queue the given ids. The timer is armed immediately when there is
    /// anything to admit (the field is empty, so the center is clear).
    pub fn queued(ids: impl IntoIterator<Item = BallId>, now: Time) -> Self {
        let incoming: VecDeque<BallId> = ids.into_iter().collect();
        let timer = if incoming.is_empty() {
            BallTimer::WaitingForFreeSpace
        } else {
            BallTimer::FreeSince(now)
        };
        Self {
            in_game: BTreeMap::new(),
            incoming,
            timer,
        }
    }

    /// True when no in-game ball is within two radii of the field center.
    ///
    /// Compares squared distances.
    pub fn center_is_free(&self) -> bool {
        self.in_game
            .values()
            .all(|ball| ball.position.distance_squared(FIELD_CENTER) > CENTER_CLEARANCE_SQ)
    }

    /// Advance the lifecycle by one frame.
    ///
    /// Runs the re-arm check then the admission check. An admitted ball
    /// rests at the field center with its pose valid at `placed_at`.
    /// Returns the admitted id, if any.
    pub fn step(&mut self, now: Time, placed_at: Time, admission_delay_ms: f64) -> Option<BallId> {
        // 1. Re-arm
        if self.timer == BallTimer::WaitingForFreeSpace
            && !self.incoming.is_empty()
            && self.center_is_free()
        {
            self.timer = BallTimer::FreeSince(now);
        }

        // 2. Admission
        let BallTimer::FreeSince(armed_at) = self.timer else {
            return None;
        };
        if now - armed_at < admission_delay_ms {
            return None;
        }
        let id = self.incoming.pop_front()?;
        debug_assert!(!self.in_game.contains_key(&id), "ball id {id} reused");
        self.in_game.insert(id, Ball::at_rest(FIELD_CENTER, placed_at));
        self.timer = BallTimer::WaitingForFreeSpace;
        Some(id)
    }
}
