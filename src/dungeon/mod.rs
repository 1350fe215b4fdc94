//! The finished dungeon
//!
//! Read-only aggregate of rooms, connections and keys produced by one
//! generation run.

pub mod solver;

pub use solver::{Solution, SolveStep, solve};

use serde::{Deserialize, Serialize};

use crate::world::{Connection, ConnectionId, Coordinate, DungeonGraph, Key, Room};

/// Per-layer outcome of the growth loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerReport {
    pub layer: u32,
    pub requested_rooms: u32,
    pub placed_rooms: u32,
    pub locks_added: u32,
    pub keys_placed: u32,
}

impl LayerReport {
    /// True if the frontier ran out before the layer was full
    pub fn degenerate(&self) -> bool {
        self.placed_rooms < self.requested_rooms
    }
}

/// A generated dungeon. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct Dungeon {
    seed: u64,
    #[serde(flatten)]
    graph: DungeonGraph,
    start: Coordinate,
    boss: Coordinate,
    boss_lock: ConnectionId,
    layers: Vec<LayerReport>,
}

impl Dungeon {
    pub(crate) fn new(
        seed: u64,
        graph: DungeonGraph,
        start: Coordinate,
        boss: Coordinate,
        boss_lock: ConnectionId,
        layers: Vec<LayerReport>,
    ) -> Self {
        Self {
            seed,
            graph,
            start,
            boss,
            boss_lock,
            layers,
        }
    }

    /// Seed the dungeon was generated from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn graph(&self) -> &DungeonGraph {
        &self.graph
    }

    pub fn rooms(&self) -> &[Room] {
        self.graph.rooms()
    }

    pub fn connections(&self) -> &[Connection] {
        self.graph.connections()
    }

    pub fn keys(&self) -> &[Key] {
        self.graph.keys()
    }

    pub fn room(&self, coord: Coordinate) -> Option<&Room> {
        self.graph.room(coord)
    }

    /// Coordinate of the start room
    pub fn start(&self) -> Coordinate {
        self.start
    }

    /// Coordinate of the boss room
    pub fn boss(&self) -> Coordinate {
        self.boss
    }

    pub fn start_room(&self) -> Option<&Room> {
        self.graph.room(self.start)
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.graph.room(self.boss)
    }

    /// The locked connection in front of the boss room
    pub fn boss_lock(&self) -> Option<&Connection> {
        self.graph.connection(self.boss_lock)
    }

    /// Reports for layers 1.., in growth order
    pub fn layer_reports(&self) -> &[LayerReport] {
        &self.layers
    }

    /// Index of the last grown layer (the boss sits one above it)
    pub fn final_layer(&self) -> u32 {
        self.layers.last().map_or(0, |r| r.layer)
    }

    /// Walk from the start room to the boss, collecting keys on the way
    pub fn solve(&self) -> Option<Solution> {
        solve(&self.graph, self.start, self.boss)
    }
}
