//! Generation configuration
//!
//! Tunable parameters for a generation run, with validation and RON file
//! loading.

pub mod loader;

pub use loader::{
    ConfigFileError, default_config_path, export_default_config, load_config, load_or_default,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{AdjacencyRule, Bounds, Coordinate, Grid};

/// Side length of the window a random start coordinate is drawn from on
/// an unbounded grid
pub const START_WINDOW: i32 = 16;

/// Inclusive count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Range holding exactly one value
    pub const fn exactly(value: u32) -> Self {
        Self { min: value, max: value }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

/// How many cross-layer connections get locked per layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LocksPerLayer {
    /// Lock this many (or every candidate if there are fewer)
    Count(u32),
    /// Lock this share of the candidates, rounded to nearest
    Fraction(f32),
}

impl Default for LocksPerLayer {
    fn default() -> Self {
        LocksPerLayer::Count(1)
    }
}

impl LocksPerLayer {
    /// Number of locks to place among `candidates` lockable connections
    pub fn count_for(&self, candidates: usize) -> usize {
        match *self {
            LocksPerLayer::Count(n) => (n as usize).min(candidates),
            LocksPerLayer::Fraction(f) => {
                let wanted = (f.clamp(0.0, 1.0) as f64 * candidates as f64).round() as usize;
                wanted.min(candidates)
            }
        }
    }
}

/// Invalid configuration, reported before generation starts
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field}: max ({max}) is below min ({min})")]
    InvalidRange { field: &'static str, min: u32, max: u32 },
    #[error("layer_count must allow at least one layer after the start room (min is {0})")]
    TooFewLayers(u32),
    #[error("rooms_per_layer must request at least one room (min is {0})")]
    TooFewRooms(u32),
    #[error("locks_per_layer fraction {0} is outside 0.0..=1.0")]
    InvalidFraction(f32),
    #[error("bounds hold {area} cells but up to {required} rooms may be requested")]
    BoundsTooSmall { area: i64, required: i64 },
    #[error("start coordinate {0} is outside the bounds")]
    StartOutOfBounds(Coordinate),
}

/// Parameters for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Seed for the random source
    pub seed: u64,
    /// Fixed start coordinate; random when `None`
    pub start: Option<Coordinate>,
    /// Rooms requested per grown layer
    pub rooms_per_layer: CountRange,
    /// Layers grown after the start layer
    pub layer_count: CountRange,
    pub adjacency: AdjacencyRule,
    pub locks_per_layer: LocksPerLayer,
    /// Optional grid limits
    pub bounds: Option<Bounds>,
    /// Open every adjacent pair inside a freshly grown layer
    pub same_layer_connections: bool,
    /// Add shortcut edges between remaining adjacent pairs
    pub shortcuts: bool,
    /// Prefer rooms that hold no key yet when placing keys. Off by default,
    /// so key rooms are drawn uniformly.
    pub spread_keys: bool,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start: None,
            rooms_per_layer: CountRange::new(4, 7),
            layer_count: CountRange::new(3, 5),
            adjacency: AdjacencyRule::Orthogonal,
            locks_per_layer: LocksPerLayer::Count(1),
            bounds: None,
            same_layer_connections: true,
            shortcuts: true,
            spread_keys: false,
        }
    }
}

impl DungeonConfig {
    /// Default configuration with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// The grid this configuration generates on
    pub fn grid(&self) -> Grid {
        Grid::new(self.adjacency, self.bounds)
    }

    /// Upper bound on the rooms a run can create, boss included
    pub fn max_rooms(&self) -> i64 {
        1 + self.layer_count.max as i64 * self.rooms_per_layer.max as i64 + 1
    }

    /// Check the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, range) in [
            ("rooms_per_layer", self.rooms_per_layer),
            ("layer_count", self.layer_count),
        ] {
            if !range.is_valid() {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        if self.layer_count.min == 0 {
            return Err(ConfigError::TooFewLayers(self.layer_count.min));
        }
        if self.rooms_per_layer.min == 0 {
            return Err(ConfigError::TooFewRooms(self.rooms_per_layer.min));
        }

        if let LocksPerLayer::Fraction(f) = self.locks_per_layer {
            if !(0.0..=1.0).contains(&f) {
                return Err(ConfigError::InvalidFraction(f));
            }
        }

        if let Some(bounds) = self.bounds {
            let required = self.max_rooms();
            if bounds.area() < required {
                return Err(ConfigError::BoundsTooSmall {
                    area: bounds.area(),
                    required,
                });
            }
            if let Some(start) = self.start {
                if !bounds.contains(start) {
                    return Err(ConfigError::StartOutOfBounds(start));
                }
            }
        }

        Ok(())
    }
}
