//! Dungeon solver
//!
//! Explores from the start room, picking up every key it walks past and
//! opening locks once their key is in hand.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::world::{ConnectionId, Coordinate, DungeonGraph, KeyId};

/// One action of a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStep {
    Enter(Coordinate),
    PickUp(KeyId),
    Unlock(ConnectionId),
}

/// A traversal that reaches the goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub steps: Vec<SolveStep>,
}

impl Solution {
    pub fn rooms_entered(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, SolveStep::Enter(_))).count()
    }

    pub fn keys_collected(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, SolveStep::PickUp(_))).count()
    }

    pub fn locks_opened(&self) -> usize {
        self.steps.iter().filter(|s| matches!(s, SolveStep::Unlock(_))).count()
    }
}

struct Walker<'a> {
    graph: &'a DungeonGraph,
    steps: Vec<SolveStep>,
    visited: HashSet<Coordinate>,
    held: HashSet<ConnectionId>,
    opened: HashSet<ConnectionId>,
    queue: VecDeque<Coordinate>,
}

impl<'a> Walker<'a> {
    fn enter(&mut self, coord: Coordinate) {
        if !self.visited.insert(coord) {
            return;
        }
        self.steps.push(SolveStep::Enter(coord));

        if let Some(room) = self.graph.room(coord) {
            for &id in &room.keys {
                if let Some(key) = self.graph.key(id) {
                    self.steps.push(SolveStep::PickUp(id));
                    self.held.insert(key.lock);
                }
            }
        }
        self.queue.push_back(coord);
    }

    fn open(&mut self, lock: ConnectionId) {
        if self.opened.insert(lock) {
            self.steps.push(SolveStep::Unlock(lock));
        }
    }
}

/// Find a key-respecting traversal from `start` to `goal`
pub fn solve(graph: &DungeonGraph, start: Coordinate, goal: Coordinate) -> Option<Solution> {
    if graph.room(start).is_none() {
        return None;
    }

    let mut walker = Walker {
        graph,
        steps: Vec::new(),
        visited: HashSet::new(),
        held: HashSet::new(),
        opened: HashSet::new(),
        queue: VecDeque::new(),
    };
    // Locked doors seen but not yet openable
    let mut blocked: Vec<(ConnectionId, Coordinate)> = Vec::new();

    walker.enter(start);
    loop {
        while let Some(current) = walker.queue.pop_front() {
            for conn in graph.connections_of(current) {
                let Some(next) = conn.other(current) else { continue };
                if walker.visited.contains(&next) {
                    continue;
                }
                if conn.is_locked() {
                    if !walker.held.contains(&conn.id) {
                        blocked.push((conn.id, next));
                        continue;
                    }
                    walker.open(conn.id);
                }
                walker.enter(next);
            }
        }

        let (ready, waiting): (Vec<_>, Vec<_>) = blocked
            .into_iter()
            .filter(|(_, next)| !walker.visited.contains(next))
            .partition(|(lock, _)| walker.held.contains(lock));
        blocked = waiting;
        if ready.is_empty() {
            break;
        }
        for (lock, next) in ready {
            if !walker.visited.contains(&next) {
                walker.open(lock);
                walker.enter(next);
            }
        }
    }

    if walker.visited.contains(&goal) {
        Some(Solution { steps: walker.steps })
    } else {
        None
    }
}
