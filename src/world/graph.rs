//! Room/connection graph
//!
//! Typed graph over grid coordinates. Rooms are unique per coordinate and
//! connections only join grid-adjacent rooms, at most one per pair.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Coordinate, Grid};

/// Index of a connection in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub usize);

/// Index of a key in placement order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyId(pub usize);

/// What a room is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoomRole {
    #[default]
    Normal,
    Start,
    Boss,
}

/// A room on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub coord: Coordinate,
    /// Growth pass that created this room
    pub layer: u32,
    pub role: RoomRole,
    /// Keys lying in this room
    pub keys: Vec<KeyId>,
}

impl Room {
    pub fn has_key(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// How a connection may be traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionKind {
    /// Freely traversable
    Open,
    /// Needs the matching key
    Locked,
    /// Redundant always-open edge
    Shortcut,
}

/// An edge between two adjacent rooms. Endpoints are stored with `a < b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub a: Coordinate,
    pub b: Coordinate,
    pub kind: ConnectionKind,
    /// Layer pass that created the edge
    pub layer: u32,
}

impl Connection {
    /// The endpoint opposite `coord`
    pub fn other(&self, coord: Coordinate) -> Option<Coordinate> {
        if self.a == coord {
            Some(self.b)
        } else if self.b == coord {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn is_locked(&self) -> bool {
        self.kind == ConnectionKind::Locked
    }
}

/// A key that opens exactly one locked connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub id: KeyId,
    /// The locked connection this key opens
    pub lock: ConnectionId,
    /// Room holding the key
    pub room: Coordinate,
}

/// How locked connections are treated by reachability queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Traversal {
    /// Every lock is open
    IgnoreLocks,
    /// Every lock is a wall
    RespectLocks,
    /// A lock opens once its key lies in a room already reached
    CollectKeys,
}

/// Graph errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("a room already occupies {0}")]
    DuplicateCoordinate(Coordinate),
    #[error("{0} is outside the grid bounds")]
    OutOfBounds(Coordinate),
    #[error("{0} and {1} are not adjacent")]
    NotAdjacent(Coordinate, Coordinate),
    #[error("{0} and {1} are already connected")]
    DuplicateConnection(Coordinate, Coordinate),
    #[error("no room at {0}")]
    UnknownRoom(Coordinate),
    #[error("no connection with id {0:?}")]
    UnknownConnection(ConnectionId),
    #[error("connection {0:?} is not locked")]
    NotLocked(ConnectionId),
    #[error("connection {0:?} already has a key")]
    DuplicateKey(ConnectionId),
}

/// Normalised endpoint pair
fn edge(a: Coordinate, b: Coordinate) -> (Coordinate, Coordinate) {
    if a <= b { (a, b) } else { (b, a) }
}

/// The dungeon's rooms, connections and keys
#[derive(Debug, Clone, Serialize)]
pub struct DungeonGraph {
    grid: Grid,
    rooms: Vec<Room>,
    connections: Vec<Connection>,
    keys: Vec<Key>,
    #[serde(skip)]
    room_index: HashMap<Coordinate, usize>,
    #[serde(skip)]
    layers: Vec<Vec<Coordinate>>,
    #[serde(skip)]
    edge_index: HashMap<(Coordinate, Coordinate), ConnectionId>,
    #[serde(skip)]
    incident: HashMap<Coordinate, Vec<ConnectionId>>,
    #[serde(skip)]
    lock_keys: HashMap<ConnectionId, KeyId>,
}

impl DungeonGraph {
    /// Create an empty graph on the given grid
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            rooms: Vec::new(),
            connections: Vec::new(),
            keys: Vec::new(),
            room_index: HashMap::new(),
            layers: Vec::new(),
            edge_index: HashMap::new(),
            incident: HashMap::new(),
            lock_keys: HashMap::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    // ------------------------------------------------------------------
    // Rooms
    // ------------------------------------------------------------------

    /// Add a room at `coord`
    pub fn add_room(
        &mut self,
        coord: Coordinate,
        layer: u32,
        role: RoomRole,
    ) -> Result<&Room, GraphError> {
        if self.room_index.contains_key(&coord) {
            return Err(GraphError::DuplicateCoordinate(coord));
        }
        if !self.grid.in_bounds(coord) {
            return Err(GraphError::OutOfBounds(coord));
        }

        let idx = self.rooms.len();
        self.rooms.push(Room {
            coord,
            layer,
            role,
            keys: Vec::new(),
        });
        self.room_index.insert(coord, idx);

        let layer = layer as usize;
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, Vec::new);
        }
        self.layers[layer].push(coord);

        Ok(&self.rooms[idx])
    }

    pub fn room(&self, coord: Coordinate) -> Option<&Room> {
        self.room_index.get(&coord).map(|&idx| &self.rooms[idx])
    }

    pub fn is_occupied(&self, coord: Coordinate) -> bool {
        self.room_index.contains_key(&coord)
    }

    /// All rooms in creation order
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Rooms of one layer, in creation order
    pub fn rooms_in_layer(&self, layer: u32) -> Vec<&Room> {
        self.layer_coords(layer)
            .iter()
            .filter_map(|c| self.room(*c))
            .collect()
    }

    /// Coordinates of one layer, in creation order
    pub fn layer_coords(&self, layer: u32) -> &[Coordinate] {
        self.layers
            .get(layer as usize)
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Number of layers holding at least one room slot
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Occupied neighbours of `coord`, in adjacency order
    pub fn occupied_neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        self.grid
            .neighbors(coord)
            .into_iter()
            .filter(|c| self.is_occupied(*c))
            .collect()
    }

    /// Unoccupied on-grid neighbours of `coord`, in adjacency order
    pub fn free_neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        self.grid
            .neighbors(coord)
            .into_iter()
            .filter(|c| !self.is_occupied(*c))
            .collect()
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Connect two existing, adjacent rooms
    pub fn add_connection(
        &mut self,
        a: Coordinate,
        b: Coordinate,
        kind: ConnectionKind,
        layer: u32,
    ) -> Result<&Connection, GraphError> {
        for coord in [a, b] {
            if !self.is_occupied(coord) {
                return Err(GraphError::UnknownRoom(coord));
            }
        }
        if !self.grid.is_adjacent(a, b) {
            return Err(GraphError::NotAdjacent(a, b));
        }
        let key = edge(a, b);
        if self.edge_index.contains_key(&key) {
            return Err(GraphError::DuplicateConnection(a, b));
        }

        let id = ConnectionId(self.connections.len());
        self.connections.push(Connection {
            id,
            a: key.0,
            b: key.1,
            kind,
            layer,
        });
        self.edge_index.insert(key, id);
        self.incident.entry(a).or_default().push(id);
        self.incident.entry(b).or_default().push(id);

        Ok(&self.connections[id.0])
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    pub fn connection_between(&self, a: Coordinate, b: Coordinate) -> Option<&Connection> {
        self.edge_index
            .get(&edge(a, b))
            .and_then(|id| self.connection(*id))
    }

    pub fn is_connected(&self, a: Coordinate, b: Coordinate) -> bool {
        self.edge_index.contains_key(&edge(a, b))
    }

    /// All connections in creation order
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections touching `coord`, in creation order
    pub fn connections_of(&self, coord: Coordinate) -> Vec<&Connection> {
        self.incident
            .get(&coord)
            .map(|ids| ids.iter().map(|id| &self.connections[id.0]).collect())
            .unwrap_or_default()
    }

    /// Upgrade an open connection to locked
    pub fn lock_connection(&mut self, id: ConnectionId) -> Result<(), GraphError> {
        let conn = self
            .connections
            .get_mut(id.0)
            .ok_or(GraphError::UnknownConnection(id))?;
        conn.kind = ConnectionKind::Locked;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    /// Put the key for `lock` into the room at `room`
    pub fn add_key(&mut self, lock: ConnectionId, room: Coordinate) -> Result<&Key, GraphError> {
        let conn = self.connection(lock).ok_or(GraphError::UnknownConnection(lock))?;
        if !conn.is_locked() {
            return Err(GraphError::NotLocked(lock));
        }
        if self.lock_keys.contains_key(&lock) {
            return Err(GraphError::DuplicateKey(lock));
        }
        let room_idx = *self.room_index.get(&room).ok_or(GraphError::UnknownRoom(room))?;

        let id = KeyId(self.keys.len());
        self.keys.push(Key { id, lock, room });
        self.rooms[room_idx].keys.push(id);
        self.lock_keys.insert(lock, id);

        Ok(&self.keys[id.0])
    }

    /// All keys in placement order
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn key(&self, id: KeyId) -> Option<&Key> {
        self.keys.get(id.0)
    }

    /// The key that opens `lock`, if one was placed
    pub fn key_for(&self, lock: ConnectionId) -> Option<&Key> {
        self.lock_keys.get(&lock).and_then(|id| self.key(*id))
    }

    // ------------------------------------------------------------------
    // Reachability
    // ------------------------------------------------------------------

    /// Check if `to` can be reached from `from`.
    /// Locked connections are walls unless `ignore_locked` is set.
    pub fn is_reachable(&self, from: Coordinate, to: Coordinate, ignore_locked: bool) -> bool {
        let traversal = if ignore_locked {
            Traversal::IgnoreLocks
        } else {
            Traversal::RespectLocks
        };
        self.reachable_from(from, traversal).contains(&to)
    }

    /// Every room reachable from `from` under the given traversal rule
    pub fn reachable_from(&self, from: Coordinate, traversal: Traversal) -> HashSet<Coordinate> {
        match traversal {
            Traversal::IgnoreLocks => self.flood(from, |_| true),
            Traversal::RespectLocks => self.flood(from, |conn| !conn.is_locked()),
            Traversal::CollectKeys => {
                // Grow until no newly reached room yields a usable key
                let mut reached = self.flood(from, |conn| !conn.is_locked());
                loop {
                    let next = self.flood(from, |conn| {
                        !conn.is_locked()
                            || self
                                .key_for(conn.id)
                                .map_or(false, |key| reached.contains(&key.room))
                    });
                    if next.len() == reached.len() {
                        return next;
                    }
                    reached = next;
                }
            }
        }
    }

    /// Breadth-first flood fill over connections accepted by `passable`
    fn flood<F>(&self, from: Coordinate, passable: F) -> HashSet<Coordinate>
    where
        F: Fn(&Connection) -> bool,
    {
        let mut visited = HashSet::new();
        if !self.is_occupied(from) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for conn in self.connections_of(current) {
                if !passable(conn) {
                    continue;
                }
                if let Some(next) = conn.other(current) {
                    if visited.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        visited
    }
}
