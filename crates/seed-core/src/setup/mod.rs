//! Run Setup
//!
//! Belief catalog generation, social graph construction and agent
//! population assembly.

pub mod agents;
pub mod beliefs;
pub mod social;

pub use agents::*;
pub use beliefs::*;
pub use social::*;
