//! Game Logic Module
//!
//! All match simulation code. Pure and reproducible on one machine.
//!
//! ## Module Structure
//!
//! - `field`: Field bounds, goal mouths, radii, spawn poses
//! - `state`: Players, bullets, balls and the frame snapshot
//! - `balls`: Ball entry queue and admission timer
//! - `kinematics`: Motion, thrust and shot charging
//! - `input`: Per-player controls and frame input
//! - `events`: Collision taxonomy and resolution order
//! - `collision`: Time-of-impact detection and resolution
//! - `observer`: Per-stage diagnostics hooks
//! - `config`: Simulation tunables
//! - `error`: Frame input errors
//! - `tick`: Frame orchestrator and replay

pub mod field;
pub mod state;
pub mod balls;
pub mod kinematics;
pub mod input;
pub mod events;
pub mod collision;
pub mod observer;
pub mod config;
pub mod error;
pub mod tick;

// Re-export key types
pub use state::{Game, Player, Bullet, Ball, PlayerSlot, BulletId, BallId, BulletKey, BulletSize};
pub use balls::BallTimer;
pub use input::{Controls, FrameInput};
pub use events::{Collision, CollisionCategory, CollisionKind};
pub use collision::{EnabledCollisions, Resolution};
pub use observer::{FrameObserver, NoopObserver, TracingObserver, Stage};
pub use config::SimConfig;
pub use error::FrameError;
pub use tick::{update, replay};
