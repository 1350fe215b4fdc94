//! Dungeon builder
//!
//! Drives the generation state machine:
//!
//! ```text
//! Init -> GrowingLayer(L) -> ClassifyingConnections(L) -> PlacingKeys(L)
//!      -> (GrowingLayer(L + 1) | PlacingBoss) -> PlacingFinalKey -> Done
//! ```
//!
//! Random draws happen in a fixed order: start coordinate (unless fixed),
//! layer count, then per layer the room count, each room's cell and parent,
//! the lock subset and the key rooms; finally the boss cell, the boss
//! neighbour and the boss key room.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::boss::{self, BossPlacement};
use super::classifier::{self, Classification, ClassifierOptions};
use super::grower::{self, LayerGrowth};
use super::keys;
use super::{GenerationError, Placement};
use crate::config::{DungeonConfig, START_WINDOW};
use crate::dungeon::{Dungeon, LayerReport};
use crate::world::{Coordinate, DungeonGraph, RoomRole, Traversal};

/// Generation states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Init,
    GrowingLayer(u32),
    ClassifyingConnections(u32),
    PlacingKeys(u32),
    PlacingBoss,
    PlacingFinalKey,
    Done,
}

/// Owns all mutable state of one generation run
pub struct DungeonBuilder<R: Rng> {
    config: DungeonConfig,
    options: ClassifierOptions,
    rng: R,
    graph: DungeonGraph,
    state: BuildState,
    start: Coordinate,
    /// Number of layers to grow after the start layer
    target_layers: u32,
    /// Output of the last growth pass
    growth: LayerGrowth,
    /// Output of the last classification pass
    classification: Classification,
    reports: Vec<LayerReport>,
    boss: Option<BossPlacement>,
}

impl DungeonBuilder<StdRng> {
    /// Builder seeded from `config.seed`
    pub fn new(config: DungeonConfig) -> Result<Self, GenerationError> {
        let rng = StdRng::seed_from_u64(config.seed);
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> DungeonBuilder<R> {
    /// Builder drawing from `rng`. Fails if the configuration is invalid.
    pub fn with_rng(config: DungeonConfig, rng: R) -> Result<Self, GenerationError> {
        config.validate()?;

        Ok(Self {
            options: ClassifierOptions::from(&config),
            graph: DungeonGraph::new(config.grid()),
            config,
            rng,
            state: BuildState::Init,
            start: Coordinate::new(0, 0),
            target_layers: 0,
            growth: LayerGrowth::default(),
            classification: Classification::default(),
            reports: Vec::new(),
            boss: None,
        })
    }

    /// Get the current state
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// The graph as built so far
    pub fn graph(&self) -> &DungeonGraph {
        &self.graph
    }

    /// Layers this run will try to grow (known after `Init`)
    pub fn target_layers(&self) -> u32 {
        self.target_layers
    }

    /// Run every remaining state and hand out the finished dungeon
    pub fn build(mut self) -> Result<Dungeon, GenerationError> {
        while self.state != BuildState::Done {
            self.step()?;
        }
        self.finish()
    }

    /// Advance one state
    pub fn step(&mut self) -> Result<BuildState, GenerationError> {
        let next = match self.state {
            BuildState::Init => self.init()?,
            BuildState::GrowingLayer(layer) => self.grow(layer)?,
            BuildState::ClassifyingConnections(layer) => self.classify(layer)?,
            BuildState::PlacingKeys(layer) => self.place_keys(layer)?,
            BuildState::PlacingBoss => self.place_boss()?,
            BuildState::PlacingFinalKey => self.place_final_key()?,
            BuildState::Done => BuildState::Done,
        };

        if next != self.state {
            log::debug!("State transition: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        Ok(next)
    }

    fn init(&mut self) -> Result<BuildState, GenerationError> {
        let start = match self.config.start {
            Some(start) => start,
            None => self.random_start(),
        };
        self.graph.add_room(start, 0, RoomRole::Start)?;
        self.start = start;

        let range = self.config.layer_count;
        self.target_layers = self.rng.gen_range(range.min..=range.max);

        log::info!(
            "Generating dungeon: seed {}, start {}, {} layers, {} adjacency",
            self.config.seed,
            start,
            self.target_layers,
            self.config.adjacency.name()
        );
        Ok(BuildState::GrowingLayer(1))
    }

    fn random_start(&mut self) -> Coordinate {
        match self.config.bounds {
            Some(b) => Coordinate::new(
                self.rng.gen_range(b.min_x..=b.max_x),
                self.rng.gen_range(b.min_y..=b.max_y),
            ),
            None => Coordinate::new(
                self.rng.gen_range(0..START_WINDOW),
                self.rng.gen_range(0..START_WINDOW),
            ),
        }
    }

    fn grow(&mut self, layer: u32) -> Result<BuildState, GenerationError> {
        let range = self.config.rooms_per_layer;
        let requested = self.rng.gen_range(range.min..=range.max);

        self.growth = grower::grow_layer(&mut self.graph, &mut self.rng, layer, requested)?;
        if self.growth.rooms.is_empty() {
            log::warn!("Layer {} has no room to grow, stopping after layer {}", layer, layer - 1);
            return Ok(BuildState::PlacingBoss);
        }

        Ok(BuildState::ClassifyingConnections(layer))
    }

    fn classify(&mut self, layer: u32) -> Result<BuildState, GenerationError> {
        self.classification = classifier::classify_layer(
            &mut self.graph,
            &mut self.rng,
            &self.growth,
            &self.options,
        )?;
        Ok(BuildState::PlacingKeys(layer))
    }

    fn place_keys(&mut self, layer: u32) -> Result<BuildState, GenerationError> {
        let placed = keys::distribute_keys(
            &mut self.graph,
            &mut self.rng,
            self.start,
            layer,
            &self.classification.locks,
            self.config.spread_keys,
        )?;

        let report = LayerReport {
            layer,
            requested_rooms: self.growth.requested,
            placed_rooms: self.growth.rooms.len() as u32,
            locks_added: self.classification.locks_added() as u32,
            keys_placed: placed.len() as u32,
        };
        log::info!(
            "Layer {}: {}/{} rooms, {} locks, {} keys",
            layer,
            report.placed_rooms,
            report.requested_rooms,
            report.locks_added,
            report.keys_placed
        );
        self.reports.push(report);

        if layer < self.target_layers {
            Ok(BuildState::GrowingLayer(layer + 1))
        } else {
            Ok(BuildState::PlacingBoss)
        }
    }

    /// Last layer that received rooms
    fn final_layer(&self) -> u32 {
        self.reports.last().map_or(0, |r| r.layer)
    }

    fn place_boss(&mut self) -> Result<BuildState, GenerationError> {
        let final_layer = self.final_layer();
        match boss::place_boss(&mut self.graph, &mut self.rng, final_layer)? {
            Placement::Placed(placement) => {
                self.boss = Some(placement);
                Ok(BuildState::PlacingFinalKey)
            }
            Placement::Deferred(reason) => {
                log::error!("Boss placement failed: {}", reason);
                Err(GenerationError::NoSpaceForBoss)
            }
        }
    }

    fn place_final_key(&mut self) -> Result<BuildState, GenerationError> {
        let boss = self.boss.ok_or(GenerationError::NoSpaceForBoss)?;
        // The final layer, unless the boss had to hang off an earlier one
        let key_layer = boss.anchor_layer;
        let region = self.graph.reachable_from(self.start, Traversal::CollectKeys);
        let spread = self.config.spread_keys;
        let boss_layer = self.final_layer() + 1;

        let graph = &self.graph;
        let rng = &mut self.rng;
        let room = keys::choose_key_room(graph, rng, &region, spread, |l| l == key_layer)
            .or_else(|| keys::choose_key_room(graph, rng, &region, spread, |l| l <= key_layer))
            .ok_or(GenerationError::UnsolvableKeyPlacement {
                layer: boss_layer,
                lock: boss.lock,
            })?;

        self.graph.add_key(boss.lock, room)?;
        log::debug!("Boss key placed at {}", room);
        Ok(BuildState::Done)
    }

    fn finish(self) -> Result<Dungeon, GenerationError> {
        let boss = self.boss.ok_or(GenerationError::NoSpaceForBoss)?;
        let dungeon = Dungeon::new(
            self.config.seed,
            self.graph,
            self.start,
            boss.room,
            boss.lock,
            self.reports,
        );

        // Every key placement was checked, so this only trips on a bug
        if dungeon.solve().is_none() {
            return Err(GenerationError::UnsolvableKeyPlacement {
                layer: boss.anchor_layer + 1,
                lock: boss.lock,
            });
        }

        log::info!(
            "Generated dungeon: {} rooms, {} connections, {} keys, boss at {}",
            dungeon.rooms().len(),
            dungeon.connections().len(),
            dungeon.keys().len(),
            dungeon.boss()
        );
        Ok(dungeon)
    }
}
