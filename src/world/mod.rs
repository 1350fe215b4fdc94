//! World module
//!
//! Grid coordinates, adjacency and the room/connection graph.

pub mod grid;
pub mod graph;

pub use grid::{AdjacencyRule, Bounds, Coordinate, Grid};
pub use graph::{
    Connection, ConnectionId, ConnectionKind, DungeonGraph, GraphError, Key, KeyId, Room, RoomRole,
    Traversal,
};
