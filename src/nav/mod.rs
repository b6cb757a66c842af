//! # Navigation Module
//!
//! Run-time movement over generated environments: grid pathfinding and
//! per-tick movement validation with collision hit-testing. Everything
//! here is pure computation over already-resident data; a rejected move is
//! an ordinary outcome, never an error.

pub mod movement;
pub mod path;

pub use movement::*;
pub use path::*;
