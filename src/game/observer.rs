//! Frame Observers
//!
//! Hooks the orchestrator calls after each pipeline stage and for each
//! resolved collision. Diagnostics are opt-in: pass a `TracingObserver` to
//! get per-stage logs, or `NoopObserver` for none.

use tracing::{debug, trace};

use crate::game::collision::Resolution;
use crate::game::state::{BallId, Game};

/// Pipeline stage of a frame update, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Ball re-arm and admission
    BallLifecycle,
    /// Input applied to player velocity and facing
    PlayerPreparation,
    /// Detection and resolution
    Collisions,
    /// Every entity moved to the new frame time
    Motion,
    /// New bullets placed and frame id incremented
    Spawning,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::BallLifecycle,
        Stage::PlayerPreparation,
        Stage::Collisions,
        Stage::Motion,
        Stage::Spawning,
    ];
}

/// Receives the intermediate state of a frame update.
///
/// All methods default to no-ops.
pub trait FrameObserver {
    /// Called after each stage with the state it produced.
    fn on_stage(&mut self, _stage: Stage, _game: &Game) {}

    /// Called once per resolved collision, in resolution order.
    fn on_collision(&mut self, _resolution: &Resolution) {}

    /// Called when a ball enters the field.
    fn on_ball_admitted(&mut self, _id: BallId, _game: &Game) {}
}

/// Observer that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl FrameObserver for NoopObserver {}

/// Observer that logs through `tracing`.
///
/// Stages log at TRACE, collisions and admissions at DEBUG.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl FrameObserver for TracingObserver {
    fn on_stage(&mut self, stage: Stage, game: &Game) {
        trace!(
            ?stage,
            frame_id = game.frame_id,
            balls = game.balls.in_game.len(),
            bullets = game.bullet_count(),
            "Stage complete"
        );
    }

    fn on_collision(&mut self, resolution: &Resolution) {
        debug!(
            time = resolution.collision.time,
            kind = ?resolution.collision.kind,
            applied = resolution.applied,
            "Collision resolved"
        );
    }

    fn on_ball_admitted(&mut self, id: BallId, game: &Game) {
        debug!(ball_id = id, frame_time = game.frame_time, "Ball admitted");
    }
}

/// Observer that records everything it sees. Used by tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingObserver {
    /// (stage, frame id, frame time) after each stage
    pub stages: Vec<(Stage, u64, f64)>,
    /// Resolved collisions in order
    pub collisions: Vec<Resolution>,
    /// Admitted ball ids in order
    pub admitted: Vec<BallId>,
}

#[cfg(test)]
impl FrameObserver for RecordingObserver {
    fn on_stage(&mut self, stage: Stage, game: &Game) {
        self.stages.push((stage, game.frame_id, game.frame_time));
    }

    fn on_collision(&mut self, resolution: &Resolution) {
        self.collisions.push(*resolution);
    }

    fn on_ball_admitted(&mut self, id: BallId, _game: &Game) {
        self.admitted.push(id);
    }
}
