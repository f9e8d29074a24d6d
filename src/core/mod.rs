//! Core primitives.
//!
//! Value types shared by every simulation module.

pub mod vec2;
pub mod hash;

// Re-export core types
pub use vec2::Vec2;
pub use hash::{compute_state_hash, StateHash, StateHasher};
