//! Grid model
//!
//! Coordinates on an unbounded (or optionally bounded) 2D grid and the
//! adjacency rule every other component uses.

use serde::{Deserialize, Serialize};

/// Orthogonal offsets, in the fixed order neighbours are reported
const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Orthogonal offsets followed by the diagonals
const OCTILE: [(i32, i32); 8] = [
    (-1, 0), (1, 0), (0, -1), (0, 1),
    (-1, -1), (1, -1), (-1, 1), (1, 1),
];

/// A cell on the grid. Rooms are identified by their coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this coordinate by (dx, dy)
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Which cells count as neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdjacencyRule {
    /// 4-directional
    #[default]
    Orthogonal,
    /// 8-directional (orthogonal plus diagonals)
    Octile,
}

impl AdjacencyRule {
    /// Neighbour offsets for this rule
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            AdjacencyRule::Orthogonal => &ORTHOGONAL,
            AdjacencyRule::Octile => &OCTILE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdjacencyRule::Orthogonal => "4-directional",
            AdjacencyRule::Octile => "8-directional",
        }
    }
}

/// Inclusive rectangular limits for a bounded grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Bounds covering `width` x `height` cells starting at the origin
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            min_x: 0,
            min_y: 0,
            max_x: width - 1,
            max_y: height - 1,
        }
    }

    #[inline]
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.x >= self.min_x
            && coord.x <= self.max_x
            && coord.y >= self.min_y
            && coord.y <= self.max_y
    }

    pub fn width(&self) -> i64 {
        (self.max_x as i64 - self.min_x as i64 + 1).max(0)
    }

    pub fn height(&self) -> i64 {
        (self.max_y as i64 - self.min_y as i64 + 1).max(0)
    }

    /// Number of cells inside the bounds
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }
}

/// Coordinate space plus adjacency rule. Pure and stateless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Grid {
    pub rule: AdjacencyRule,
    pub bounds: Option<Bounds>,
}

impl Grid {
    pub fn new(rule: AdjacencyRule, bounds: Option<Bounds>) -> Self {
        Self { rule, bounds }
    }

    /// Unbounded grid with the given rule
    pub fn unbounded(rule: AdjacencyRule) -> Self {
        Self { rule, bounds: None }
    }

    /// Check if a coordinate lies on the grid
    #[inline]
    pub fn in_bounds(&self, coord: Coordinate) -> bool {
        self.bounds.map_or(true, |b| b.contains(coord))
    }

    /// All on-grid neighbours of `coord`, in a fixed order
    pub fn neighbors(&self, coord: Coordinate) -> Vec<Coordinate> {
        self.rule
            .offsets()
            .iter()
            .map(|&(dx, dy)| coord.offset(dx, dy))
            .filter(|c| self.in_bounds(*c))
            .collect()
    }

    /// Check if two coordinates are neighbours under the adjacency rule
    pub fn is_adjacent(&self, a: Coordinate, b: Coordinate) -> bool {
        if !self.in_bounds(a) || !self.in_bounds(b) {
            return false;
        }
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        self.rule.offsets().iter().any(|&offset| offset == (dx, dy))
    }
}
