//! Boss room placement
//!
//! The boss goes next to the final layer behind a lock. If the final layer
//! is boxed in, earlier layers are searched from the newest backwards.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::{DeferReason, Placement};
use crate::world::{ConnectionId, ConnectionKind, Coordinate, DungeonGraph, GraphError, RoomRole};

/// Where the boss ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossPlacement {
    pub room: Coordinate,
    /// Room the boss lock leads from
    pub neighbor: Coordinate,
    pub lock: ConnectionId,
    /// Layer whose frontier held the boss room
    pub anchor_layer: u32,
}

/// Free cells around the rooms of one layer, deterministic order
fn layer_frontier(graph: &DungeonGraph, layer: u32) -> Vec<Coordinate> {
    let mut seen = HashSet::new();
    graph
        .layer_coords(layer)
        .iter()
        .flat_map(|c| graph.free_neighbors(*c))
        .filter(|c| seen.insert(*c))
        .collect()
}

/// Place the boss room one layer above `final_layer`.
///
/// The boss keeps layer `final_layer + 1` even when it has to hang off an
/// earlier layer, so in that case its lock spans more than one layer. It
/// is the only lock that can.
pub fn place_boss<R: Rng>(
    graph: &mut DungeonGraph,
    rng: &mut R,
    final_layer: u32,
) -> Result<Placement<BossPlacement>, GraphError> {
    let boss_layer = final_layer + 1;

    for anchor_layer in (0..=final_layer).rev() {
        let candidates = layer_frontier(graph, anchor_layer);
        let Some(&room) = candidates.choose(rng) else {
            log::warn!("Boss: layer {} has no free neighbours, widening search", anchor_layer);
            continue;
        };

        let anchors: Vec<Coordinate> = graph
            .occupied_neighbors(room)
            .into_iter()
            .filter(|c| graph.room(*c).map_or(false, |r| r.layer == anchor_layer))
            .collect();
        let Some(&neighbor) = anchors.choose(rng) else {
            continue;
        };

        graph.add_room(room, boss_layer, RoomRole::Boss)?;
        let lock = graph.add_connection(neighbor, room, ConnectionKind::Locked, boss_layer)?.id;

        if anchor_layer != final_layer {
            log::warn!(
                "Boss placed next to layer {} instead of layer {}",
                anchor_layer,
                final_layer
            );
        }
        log::debug!("Boss room at {} behind {}", room, neighbor);

        return Ok(Placement::Placed(BossPlacement {
            room,
            neighbor,
            lock,
            anchor_layer,
        }));
    }

    Ok(Placement::Deferred(DeferReason::FrontierExhausted))
}
