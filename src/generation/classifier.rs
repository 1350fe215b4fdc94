//! Connection classifier
//!
//! Runs after each growth pass. Adds the growth edges, upgrades some of the
//! cross-layer ones to locks, then opens the new layer internally and adds
//! shortcuts between whatever adjacent pairs remain unconnected.

use rand::Rng;
use rand::seq::SliceRandom;

use super::grower::LayerGrowth;
use crate::config::{DungeonConfig, LocksPerLayer};
use crate::world::{ConnectionId, ConnectionKind, Coordinate, DungeonGraph, GraphError, RoomRole};

/// Classifier settings, taken from the run configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierOptions {
    pub locks_per_layer: LocksPerLayer,
    pub same_layer_connections: bool,
    pub shortcuts: bool,
}

impl From<&DungeonConfig> for ClassifierOptions {
    fn from(config: &DungeonConfig) -> Self {
        Self {
            locks_per_layer: config.locks_per_layer,
            same_layer_connections: config.same_layer_connections,
            shortcuts: config.shortcuts,
        }
    }
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self::from(&DungeonConfig::default())
    }
}

/// What the classifier added for one layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub layer: u32,
    /// Growth edges, one per new room
    pub growth_edges: Vec<ConnectionId>,
    /// Growth edges upgraded to locks, ascending
    pub locks: Vec<ConnectionId>,
    pub same_layer_edges: usize,
    pub shortcuts: usize,
}

impl Classification {
    pub fn locks_added(&self) -> usize {
        self.locks.len()
    }
}

/// Classify the connections of a freshly grown layer
pub fn classify_layer<R: Rng>(
    graph: &mut DungeonGraph,
    rng: &mut R,
    growth: &LayerGrowth,
    options: &ClassifierOptions,
) -> Result<Classification, GraphError> {
    let layer = growth.layer;
    let mut result = Classification {
        layer,
        ..Classification::default()
    };

    // Growth edges; the cross-layer ones are lock candidates
    let mut lockable = Vec::new();
    for room in &growth.rooms {
        let id = graph.add_connection(room.parent, room.coord, ConnectionKind::Open, layer)?.id;
        result.growth_edges.push(id);

        let parent_layer = graph.room(room.parent).map(|r| r.layer);
        if parent_layer.map_or(false, |l| l + 1 == layer) {
            lockable.push(id);
        }
    }

    // The start layer is never gated
    if layer >= 2 {
        let amount = options.locks_per_layer.count_for(lockable.len());
        let mut locks: Vec<ConnectionId> = lockable.choose_multiple(rng, amount).copied().collect();
        locks.sort();
        for id in &locks {
            graph.lock_connection(*id)?;
        }
        result.locks = locks;
    }

    let members: Vec<Coordinate> = graph.layer_coords(layer).to_vec();

    if options.same_layer_connections {
        for &coord in &members {
            for other in graph.occupied_neighbors(coord) {
                let same_layer = graph.room(other).map_or(false, |r| r.layer == layer);
                if same_layer && !graph.is_connected(coord, other) {
                    graph.add_connection(coord, other, ConnectionKind::Open, layer)?;
                    result.same_layer_edges += 1;
                }
            }
        }
    }

    if options.shortcuts {
        for &coord in &members {
            for other in graph.occupied_neighbors(coord) {
                let is_boss = graph.room(other).map_or(false, |r| r.role == RoomRole::Boss);
                if !is_boss && !graph.is_connected(coord, other) {
                    graph.add_connection(coord, other, ConnectionKind::Shortcut, layer)?;
                    result.shortcuts += 1;
                }
            }
        }
    }

    log::debug!(
        "Layer {}: {} growth edges, {} locked, {} same-layer, {} shortcuts",
        layer,
        result.growth_edges.len(),
        result.locks.len(),
        result.same_layer_edges,
        result.shortcuts
    );

    Ok(result)
}
