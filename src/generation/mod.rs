//! Procedural dungeon generation
//!
//! Layer-by-layer room growth with lock-and-key gating. Every generated
//! dungeon is solvable: each key lies in a room reachable without crossing
//! the lock it opens.

pub mod grower;
pub mod classifier;
pub mod keys;
pub mod boss;
pub mod builder;

pub use builder::{BuildState, DungeonBuilder};
pub use classifier::{Classification, ClassifierOptions};
pub use grower::{GrownRoom, LayerGrowth};

use rand::Rng;
use thiserror::Error;

use crate::config::{ConfigError, DungeonConfig};
use crate::dungeon::Dungeon;
use crate::world::{ConnectionId, GraphError};

/// Outcome of a placement that may legitimately find no space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<T> {
    Placed(T),
    Deferred(DeferReason),
}

/// Why a placement was deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// No free coordinate next to the rooms being grown from
    FrontierExhausted,
}

impl std::fmt::Display for DeferReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeferReason::FrontierExhausted => write!(f, "frontier exhausted"),
        }
    }
}

/// Fatal generation errors. No partial dungeon is produced.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("graph invariant violated: {0}")]
    Graph(#[from] GraphError),
    #[error("no reachable room can hold the key for {lock:?} (layer {layer})")]
    UnsolvableKeyPlacement { layer: u32, lock: ConnectionId },
    #[error("no free coordinate left for the boss room")]
    NoSpaceForBoss,
}

/// Generate a dungeon from `config`, seeding the random source from
/// `config.seed`
pub fn generate(config: &DungeonConfig) -> Result<Dungeon, GenerationError> {
    DungeonBuilder::new(config.clone())?.build()
}

/// Generate a dungeon drawing from a caller-supplied random source
pub fn generate_with_rng<R: Rng>(
    config: &DungeonConfig,
    rng: R,
) -> Result<Dungeon, GenerationError> {
    DungeonBuilder::with_rng(config.clone(), rng)?.build()
}
