//! Deepkeys - layered lock-and-key dungeon generation
//!
//! Grows a dungeon outward from a start room one layer at a time, gates
//! later layers behind locks and hides every key somewhere the player can
//! already reach, then seals a boss room behind a final lock.

pub mod config;
pub mod world;
pub mod generation;
pub mod dungeon;

// Re-export commonly used types
pub use config::{ConfigError, CountRange, DungeonConfig, LocksPerLayer};
pub use dungeon::{Dungeon, LayerReport, Solution, SolveStep};
pub use generation::{GenerationError, generate, generate_with_rng};
pub use world::{AdjacencyRule, Bounds, Connection, ConnectionKind, Coordinate, Key, Room, RoomRole};
