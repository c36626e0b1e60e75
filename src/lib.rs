//! Turn-synchronous maze chase simulation engine: terrain generation with
//! connectivity guarantees, A* enemy AI, traps and energy, two game modes,
//! and session-scoped scoring.

pub mod constants;
pub mod enemy;
pub mod engine;
pub mod grid;
pub mod path;
pub mod player;
pub mod rng;
pub mod score;
pub mod types;
