//! Key distributor
//!
//! Places one key per new lock in an earlier layer, only in rooms the
//! player can already reach with the keys placed so far.

use std::collections::HashSet;

use rand::Rng;

use super::GenerationError;
use crate::world::{ConnectionId, Coordinate, DungeonGraph, KeyId, RoomRole, Traversal};

/// Draw rooms uniformly from `pool` until one lies inside `region`
fn pick_reachable<R: Rng>(
    rng: &mut R,
    mut pool: Vec<Coordinate>,
    region: &HashSet<Coordinate>,
) -> Option<Coordinate> {
    while !pool.is_empty() {
        let idx = rng.gen_range(0..pool.len());
        let candidate = pool.swap_remove(idx);
        if region.contains(&candidate) {
            return Some(candidate);
        }
        log::debug!("Rejected key room {}: not reachable yet", candidate);
    }
    None
}

/// Choose a key room among rooms matching `eligible`.
/// With `spread`, rooms already holding a key are only tried second.
pub fn choose_key_room<R, F>(
    graph: &DungeonGraph,
    rng: &mut R,
    region: &HashSet<Coordinate>,
    spread: bool,
    eligible: F,
) -> Option<Coordinate>
where
    R: Rng,
    F: Fn(u32) -> bool,
{
    let (empty, holding): (Vec<_>, Vec<_>) = graph
        .rooms()
        .iter()
        .filter(|r| r.role != RoomRole::Boss && eligible(r.layer))
        .partition(|r| !spread || !r.has_key());

    let empty: Vec<Coordinate> = empty.into_iter().map(|r| r.coord).collect();
    let holding: Vec<Coordinate> = holding.into_iter().map(|r| r.coord).collect();

    pick_reachable(rng, empty, region).or_else(|| pick_reachable(rng, holding, region))
}

/// Place keys for the locks added in `layer`
pub fn distribute_keys<R: Rng>(
    graph: &mut DungeonGraph,
    rng: &mut R,
    start: Coordinate,
    layer: u32,
    locks: &[ConnectionId],
    spread: bool,
) -> Result<Vec<KeyId>, GenerationError> {
    if locks.is_empty() {
        return Ok(Vec::new());
    }

    // New locks have no keys yet, so the region stops in front of them
    let region = graph.reachable_from(start, Traversal::CollectKeys);
    let mut placed = Vec::with_capacity(locks.len());

    for &lock in locks {
        // Every reachable room below `layer` was a candidate, layer - 1
        // included, so a miss means the classifier locked an unreachable edge
        let Some(room) = choose_key_room(graph, rng, &region, spread, |l| l < layer) else {
            log::error!("Layer {}: no reachable room below the lock {:?}", layer, lock);
            return Err(GenerationError::UnsolvableKeyPlacement { layer, lock });
        };

        let key = graph.add_key(lock, room)?.id;
        log::debug!("Layer {}: key for {:?} placed at {}", layer, lock, room);
        placed.push(key);
    }

    Ok(placed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use crate::world::{ConnectionKind, Grid};

    fn c(x: i32, y: i32) -> Coordinate {
        Coordinate::new(x, y)
    }

    /// (0,0)L0 - (1,0)L1 - (2,0)L2 with a lock on the last edge, plus
    /// (3,0)L3 behind a second lock
    fn make_chain() -> (DungeonGraph, ConnectionId, ConnectionId) {
        let mut graph = DungeonGraph::new(Grid::default());
        graph.add_room(c(0, 0), 0, RoomRole::Start).unwrap();
        graph.add_room(c(1, 0), 1, RoomRole::Normal).unwrap();
        graph.add_room(c(2, 0), 2, RoomRole::Normal).unwrap();
        graph.add_room(c(3, 0), 3, RoomRole::Normal).unwrap();
        graph.add_connection(c(0, 0), c(1, 0), ConnectionKind::Open, 1).unwrap();
        let first = graph.add_connection(c(1, 0), c(2, 0), ConnectionKind::Open, 2).unwrap().id;
        let second = graph.add_connection(c(2, 0), c(3, 0), ConnectionKind::Open, 3).unwrap().id;
        graph.lock_connection(first).unwrap();
        graph.lock_connection(second).unwrap();
        (graph, first, second)
    }

    #[test]
    fn test_keys_land_in_earlier_reachable_layers() {
        for seed in 0..20 {
            let (mut graph, first, _) = make_chain();
            let mut rng = StdRng::seed_from_u64(seed);
            let keys = distribute_keys(&mut graph, &mut rng, c(0, 0), 2, &[first], true).unwrap();

            assert_eq!(keys.len(), 1);
            let room = graph.key(keys[0]).unwrap().room;
            assert!(graph.room(room).unwrap().layer < 2);
        }
    }

    #[test]
    fn test_key_never_behind_unopened_lock() {
        for seed in 0..20 {
            let (mut graph, first, second) = make_chain();
            let mut rng = StdRng::seed_from_u64(seed);
            distribute_keys(&mut graph, &mut rng, c(0, 0), 2, &[first], true).unwrap();
            let keys = distribute_keys(&mut graph, &mut rng, c(0, 0), 3, &[second], false).unwrap();

            // (2,0) is reachable once the first key is in hand
            let room = graph.key(keys[0]).unwrap().room;
            assert_ne!(room, c(3, 0));
            assert_eq!(graph.reachable_from(c(0, 0), Traversal::CollectKeys).len(), 4);
        }
    }

    #[test]
    fn test_spread_prefers_empty_rooms() {
        let (mut graph, first, _) = make_chain();
        graph.add_key(first, c(0, 0)).unwrap();

        let mut rng = StdRng::seed_from_u64(2);
        let region = graph.reachable_from(c(0, 0), Traversal::CollectKeys);
        for _ in 0..10 {
            let room = choose_key_room(&graph, &mut rng, &region, true, |l| l < 3).unwrap();
            assert_ne!(room, c(0, 0));
        }
    }

    #[test]
    fn test_previous_layer_is_a_candidate() {
        // Walking from (1,0), the locked door back to the start stays shut,
        // so the only reachable room below layer 2 is the layer 1 room itself
        let mut graph = DungeonGraph::new(Grid::default());
        graph.add_room(c(0, 0), 0, RoomRole::Start).unwrap();
        graph.add_room(c(1, 0), 1, RoomRole::Normal).unwrap();
        graph.add_room(c(2, 0), 2, RoomRole::Normal).unwrap();
        let back = graph.add_connection(c(0, 0), c(1, 0), ConnectionKind::Open, 1).unwrap().id;
        let ahead = graph.add_connection(c(1, 0), c(2, 0), ConnectionKind::Open, 2).unwrap().id;
        graph.lock_connection(back).unwrap();
        graph.lock_connection(ahead).unwrap();

        for seed in 0..10 {
            let mut graph = graph.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            let keys = distribute_keys(&mut graph, &mut rng, c(1, 0), 2, &[ahead], true).unwrap();
            assert_eq!(graph.key(keys[0]).unwrap().room, c(1, 0));
        }
    }

    #[test]
    fn test_unreachable_everywhere_is_fatal() {
        let mut graph = DungeonGraph::new(Grid::default());
        graph.add_room(c(0, 0), 0, RoomRole::Start).unwrap();
        graph.add_room(c(1, 0), 1, RoomRole::Normal).unwrap();
        let lock = graph.add_connection(c(0, 0), c(1, 0), ConnectionKind::Open, 1).unwrap().id;
        graph.lock_connection(lock).unwrap();

        // Starting the walk from a room that is not in the graph reaches nothing
        let mut rng = StdRng::seed_from_u64(0);
        let err = distribute_keys(&mut graph, &mut rng, c(9, 9), 1, &[lock], true).unwrap_err();
        assert!(matches!(err, GenerationError::UnsolvableKeyPlacement { layer: 1, .. }));
    }
}
