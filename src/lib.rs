//! # Arena Core
//!
//! Frame-stepped simulation core for a four-player top-down arena match.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        ARENA CORE                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Primitives                              │
//! │  ├── vec2.rs       - 2D vector                               │
//! │  └── hash.rs       - State hashing                           │
//! │                                                              │
//! │  game/             - Match logic                             │
//! │  ├── field.rs      - Bounds, goals, spawn poses              │
//! │  ├── state.rs      - Players, bullets, balls, frame          │
//! │  ├── balls.rs      - Ball entry queue and timer              │
//! │  ├── kinematics.rs - Motion and shot charging                │
//! │  ├── input.rs      - Controls and frame input                │
//! │  ├── events.rs     - Collision taxonomy                      │
//! │  ├── collision.rs  - Time-of-impact detect + resolve         │
//! │  ├── observer.rs   - Per-stage diagnostics hooks             │
//! │  ├── config.rs     - Simulation tunables                     │
//! │  └── tick.rs       - Frame orchestrator                      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Model
//!
//! A frame is an immutable `Game` snapshot. `update` takes the previous
//! frame plus input and returns the next one; the previous frame is never
//! modified. Collisions are found at their exact instant inside the frame
//! window and resolved in time order, so outcomes do not depend on the
//! frame rate.
//!
//! Given identical inputs, the simulation produces identical results on the
//! same machine (`Game::compute_hash` fingerprints a frame).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::hash::StateHash;
pub use game::{Game, FrameInput, Controls, PlayerSlot, SimConfig, FrameError};
pub use game::tick::{update, replay};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default frame step used by the demo (ms, ~60 Hz)
pub const FRAME_MS: f64 = 16.0;
