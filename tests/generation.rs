//! Properties every generated dungeon must satisfy, checked across many
//! seeds and configurations.

use std::collections::{HashMap, HashSet};

use deepkeys::generation::{BuildState, DungeonBuilder, GenerationError};
use deepkeys::world::Traversal;
use deepkeys::{
    AdjacencyRule, Bounds, ConnectionKind, CountRange, Dungeon, DungeonConfig, LocksPerLayer,
    RoomRole, SolveStep, generate,
};

const SEEDS: u64 = 40;

fn configs() -> Vec<DungeonConfig> {
    vec![
        DungeonConfig::default(),
        DungeonConfig {
            rooms_per_layer: CountRange::exactly(3),
            layer_count: CountRange::exactly(2),
            ..DungeonConfig::default()
        },
        DungeonConfig {
            adjacency: AdjacencyRule::Octile,
            locks_per_layer: LocksPerLayer::Fraction(0.5),
            layer_count: CountRange::new(4, 6),
            spread_keys: true,
            ..DungeonConfig::default()
        },
        DungeonConfig {
            rooms_per_layer: CountRange::new(1, 3),
            layer_count: CountRange::new(5, 8),
            locks_per_layer: LocksPerLayer::Count(3),
            same_layer_connections: false,
            shortcuts: false,
            spread_keys: false,
            ..DungeonConfig::default()
        },
    ]
}

fn bounded_configs() -> Vec<DungeonConfig> {
    vec![
        DungeonConfig {
            rooms_per_layer: CountRange::new(2, 4),
            layer_count: CountRange::new(3, 4),
            bounds: Some(Bounds::with_size(6, 3)),
            ..DungeonConfig::default()
        },
        DungeonConfig {
            rooms_per_layer: CountRange::exactly(3),
            layer_count: CountRange::exactly(4),
            bounds: Some(Bounds::with_size(14, 1)),
            locks_per_layer: LocksPerLayer::Fraction(1.0),
            ..DungeonConfig::default()
        },
    ]
}

/// Every (config, seed) pair
fn all_runs() -> impl Iterator<Item = DungeonConfig> {
    configs()
        .into_iter()
        .chain(bounded_configs())
        .flat_map(|config| {
            (0..SEEDS).map(move |seed| DungeonConfig { seed, ..config.clone() })
        })
}

fn layer_of(dungeon: &Dungeon, coord: deepkeys::Coordinate) -> u32 {
    dungeon.room(coord).expect("endpoint must be a room").layer
}

#[test]
fn test_determinism() {
    for config in all_runs() {
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.rooms(), b.rooms(), "rooms differ for seed {}", config.seed);
        assert_eq!(a.connections(), b.connections());
        assert_eq!(a.keys(), b.keys());
        assert_eq!(a.layer_reports(), b.layer_reports());
        assert_eq!(a.boss(), b.boss());
    }
}

#[test]
fn test_different_seeds_differ() {
    let a = generate(&DungeonConfig::with_seed(1)).unwrap();
    let b = generate(&DungeonConfig::with_seed(2)).unwrap();
    assert_ne!(a.rooms(), b.rooms());
}

#[test]
fn test_unique_coordinates() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let coords: HashSet<_> = dungeon.rooms().iter().map(|r| r.coord).collect();
        assert_eq!(coords.len(), dungeon.rooms().len());
    }
}

#[test]
fn test_connections_are_adjacent_and_unique() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let grid = dungeon.graph().grid();
        let mut pairs = HashSet::new();
        for conn in dungeon.connections() {
            assert!(grid.is_adjacent(conn.a, conn.b));
            assert!(pairs.insert((conn.a, conn.b)), "duplicate connection {:?}", conn);
        }
    }
}

#[test]
fn test_connectivity_ignoring_locks() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let reached = dungeon.graph().reachable_from(dungeon.start(), Traversal::IgnoreLocks);
        assert_eq!(reached.len(), dungeon.rooms().len(), "seed {}", config.seed);
    }
}

#[test]
fn test_solvability() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let solution = dungeon.solve().expect("every dungeon must be solvable");

        let mut held = HashSet::new();
        for step in &solution.steps {
            match *step {
                SolveStep::PickUp(key) => {
                    held.insert(dungeon.graph().key(key).unwrap().lock);
                }
                SolveStep::Unlock(lock) => {
                    assert!(held.contains(&lock), "lock {:?} opened before its key", lock);
                }
                SolveStep::Enter(_) => {}
            }
        }
        assert!(solution.steps.contains(&SolveStep::Enter(dungeon.boss())));
    }
}

#[test]
fn test_keys_precede_their_locks() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let graph = dungeon.graph();
        for key in dungeon.keys() {
            let lock = graph.connection(key.lock).unwrap();
            assert!(lock.is_locked());
            let earlier = layer_of(&dungeon, lock.a).min(layer_of(&dungeon, lock.b));
            assert!(layer_of(&dungeon, key.room) <= earlier);
        }
        // One key per lock
        let locked = dungeon.connections().iter().filter(|c| c.is_locked()).count();
        assert_eq!(dungeon.keys().len(), locked);
    }
}

#[test]
fn test_layer_monotonicity() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let boss_lock = dungeon.boss_lock().unwrap().id;
        let boss_anchor = dungeon.boss_lock().unwrap().other(dungeon.boss()).unwrap();
        let boss_fell_back = layer_of(&dungeon, boss_anchor) < dungeon.final_layer();

        for conn in dungeon.connections().iter().filter(|c| c.is_locked()) {
            let (la, lb) = (layer_of(&dungeon, conn.a), layer_of(&dungeon, conn.b));
            assert_eq!(la.max(lb), conn.layer);

            // A boss pushed off a boxed-in final layer hangs off an older room
            if conn.id == boss_lock && boss_fell_back {
                assert!(la.abs_diff(lb) > 1);
                continue;
            }
            assert_eq!(
                la.abs_diff(lb),
                1,
                "lock {:?} spans layers {} and {} (seed {})",
                conn,
                la,
                lb,
                config.seed
            );
        }
    }
}

#[test]
fn test_unbounded_boss_hangs_off_final_layer() {
    for config in configs() {
        for seed in 0..SEEDS {
            let dungeon = generate(&DungeonConfig { seed, ..config.clone() }).unwrap();
            let anchor = dungeon.boss_lock().unwrap().other(dungeon.boss()).unwrap();
            assert_eq!(layer_of(&dungeon, anchor), dungeon.final_layer());
        }
    }
}

#[test]
fn test_lock_key_balance() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let graph = dungeon.graph();

        let mut keys_per_layer: HashMap<u32, u32> = HashMap::new();
        for key in dungeon.keys() {
            *keys_per_layer.entry(graph.connection(key.lock).unwrap().layer).or_default() += 1;
        }

        for report in dungeon.layer_reports() {
            assert_eq!(report.keys_placed, report.locks_added);
            assert_eq!(keys_per_layer.get(&report.layer).copied().unwrap_or(0), report.locks_added);
            if report.layer == 1 {
                assert_eq!(report.locks_added, 0);
            }
        }
        // The boss lock gets exactly one key
        let boss_layer = dungeon.final_layer() + 1;
        assert_eq!(keys_per_layer.get(&boss_layer).copied(), Some(1));
    }
}

#[test]
fn test_roles() {
    for config in all_runs() {
        let dungeon = generate(&config).unwrap();
        let starts = dungeon.rooms().iter().filter(|r| r.role == RoomRole::Start).count();
        let bosses = dungeon.rooms().iter().filter(|r| r.role == RoomRole::Boss).count();
        assert_eq!((starts, bosses), (1, 1));

        assert_eq!(dungeon.start_room().unwrap().layer, 0);
        assert_eq!(dungeon.boss_room().unwrap().layer, dungeon.final_layer() + 1);

        let boss_edges = dungeon.graph().connections_of(dungeon.boss());
        assert_eq!(boss_edges.len(), 1);
        assert_eq!(boss_edges[0].kind, ConnectionKind::Locked);
    }
}

#[test]
fn test_layer_sizes_within_range() {
    for config in configs() {
        for seed in 0..SEEDS {
            let dungeon = generate(&DungeonConfig { seed, ..config.clone() }).unwrap();
            let reports = dungeon.layer_reports();
            assert!(reports.len() as u32 >= config.layer_count.min);
            assert!(reports.len() as u32 <= config.layer_count.max);
            for report in reports {
                // Unbounded grids never run out of space
                assert_eq!(report.placed_rooms, report.requested_rooms);
                assert!(config.rooms_per_layer.min <= report.placed_rooms);
                assert!(report.placed_rooms <= config.rooms_per_layer.max);
                let in_layer = dungeon.graph().rooms_in_layer(report.layer).len() as u32;
                assert_eq!(in_layer, report.placed_rooms);
            }
        }
    }
}

#[test]
fn test_bounded_dungeons_stay_in_bounds() {
    for config in bounded_configs() {
        let bounds = config.bounds.unwrap();
        for seed in 0..SEEDS {
            let dungeon = generate(&DungeonConfig { seed, ..config.clone() }).unwrap();
            assert!(dungeon.rooms().iter().all(|r| bounds.contains(r.coord)));
        }
    }
}

#[test]
fn test_zero_layers_is_configuration_error() {
    let config = DungeonConfig {
        layer_count: CountRange::exactly(0),
        ..DungeonConfig::default()
    };
    assert!(matches!(generate(&config), Err(GenerationError::Config(_))));
}

#[test]
fn test_builder_reaches_done() {
    let mut builder = DungeonBuilder::new(DungeonConfig::with_seed(5)).unwrap();
    let mut steps = 0;
    while builder.step().unwrap() != BuildState::Done {
        steps += 1;
        assert!(steps < 1000, "builder did not terminate");
    }
}

#[test]
fn test_json_export() {
    let dungeon = generate(&DungeonConfig::with_seed(9)).unwrap();
    let json: serde_json::Value = serde_json::to_value(&dungeon).unwrap();

    assert_eq!(json["seed"], 9);
    assert_eq!(json["rooms"].as_array().unwrap().len(), dungeon.rooms().len());
    assert_eq!(json["connections"].as_array().unwrap().len(), dungeon.connections().len());
    assert_eq!(json["keys"].as_array().unwrap().len(), dungeon.keys().len());
    assert_eq!(json["boss"]["x"], dungeon.boss().x);
}
