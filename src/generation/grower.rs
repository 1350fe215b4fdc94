//! Layer grower
//!
//! Frontier expansion that adds one layer of rooms around the previous
//! layer. Rooms placed earlier in the same pass extend the frontier, so a
//! layer branches instead of forming a chain.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{DeferReason, Placement};
use crate::world::{Coordinate, DungeonGraph, GraphError, RoomRole};

/// A room created by the grower, with the room it grew out of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrownRoom {
    pub coord: Coordinate,
    pub parent: Coordinate,
}

/// Result of one growth pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerGrowth {
    pub layer: u32,
    /// Rooms asked for
    pub requested: u32,
    /// Rooms actually placed, in placement order
    pub rooms: Vec<GrownRoom>,
}

impl LayerGrowth {
    /// True if the frontier ran out before `requested` rooms were placed
    pub fn exhausted(&self) -> bool {
        (self.rooms.len() as u32) < self.requested
    }
}

/// Check if a room on `room_layer` may seed growth of `layer`
#[inline]
fn feeds_layer(room_layer: u32, layer: u32) -> bool {
    room_layer == layer || room_layer + 1 == layer
}

/// Free coordinates next to the previous layer or the layer being built.
///
/// Order is deterministic: source rooms in creation order, neighbours in
/// adjacency order, first occurrence wins.
pub fn frontier(graph: &DungeonGraph, layer: u32) -> Vec<Coordinate> {
    let previous = layer.checked_sub(1).map(|l| graph.layer_coords(l)).unwrap_or(&[]);
    let current = graph.layer_coords(layer);

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for source in previous.iter().chain(current.iter()) {
        for coord in graph.free_neighbors(*source) {
            if seen.insert(coord) {
                candidates.push(coord);
            }
        }
    }
    candidates
}

/// Place a single room of `layer` on the current frontier
pub fn place_room<R: Rng>(
    graph: &mut DungeonGraph,
    rng: &mut R,
    layer: u32,
) -> Result<Placement<GrownRoom>, GraphError> {
    let candidates = frontier(graph, layer);
    let Some(&coord) = candidates.choose(rng) else {
        return Ok(Placement::Deferred(DeferReason::FrontierExhausted));
    };

    let parents: Vec<Coordinate> = graph
        .occupied_neighbors(coord)
        .into_iter()
        .filter(|c| graph.room(*c).map_or(false, |r| feeds_layer(r.layer, layer)))
        .collect();
    let Some(&parent) = parents.choose(rng) else {
        return Ok(Placement::Deferred(DeferReason::FrontierExhausted));
    };

    graph.add_room(coord, layer, RoomRole::Normal)?;
    log::debug!("Layer {}: room at {} grown from {}", layer, coord, parent);

    Ok(Placement::Placed(GrownRoom { coord, parent }))
}

/// Grow `requested` rooms for `layer`, or fewer if the frontier runs out
pub fn grow_layer<R: Rng>(
    graph: &mut DungeonGraph,
    rng: &mut R,
    layer: u32,
    requested: u32,
) -> Result<LayerGrowth, GraphError> {
    let mut growth = LayerGrowth {
        layer,
        requested,
        rooms: Vec::with_capacity(requested as usize),
    };

    for _ in 0..requested {
        match place_room(graph, rng, layer)? {
            Placement::Placed(room) => growth.rooms.push(room),
            Placement::Deferred(reason) => {
                log::warn!(
                    "Layer {}: {} after {} of {} rooms",
                    layer,
                    reason,
                    growth.rooms.len(),
                    requested
                );
                break;
            }
        }
    }

    Ok(growth)
}
