//! Deepkeys - Entry Point
//!
//! Loads a configuration, generates one dungeon and prints a summary,
//! optionally writing the dungeon out as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use deepkeys::config::{default_config_path, export_default_config, load_config, load_or_default};
use deepkeys::{Dungeon, generate};

#[derive(Parser, Debug)]
#[command(name = "deepkeys", version, about = "Generate a layered lock-and-key dungeon")]
struct Cli {
    /// RON config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Write the generated dungeon as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the default config to this path and exit
    #[arg(long)]
    export_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .init();

    let cli = Cli::parse();
    log::info!("Starting Deepkeys v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = cli.export_config {
        export_default_config(&path)
            .with_context(|| format!("failed to export config to {}", path.display()))?;
        return Ok(());
    }

    let mut config = match cli.config {
        Some(path) => load_config(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => load_or_default(&default_config_path()),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let dungeon = generate(&config).context("dungeon generation failed")?;
    print_summary(&dungeon);

    if let Some(path) = cli.output {
        let json = serde_json::to_string_pretty(&dungeon)?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Dungeon written to {}", path.display());
    }

    Ok(())
}

/// Print a short, human readable overview of the dungeon
fn print_summary(dungeon: &Dungeon) {
    println!("Seed {}", dungeon.seed());
    println!("Start {}  Boss {}", dungeon.start(), dungeon.boss());

    for report in dungeon.layer_reports() {
        let note = if report.degenerate() { "  (frontier exhausted)" } else { "" };
        println!(
            "  layer {:>2}: {}/{} rooms, {} locks, {} keys{}",
            report.layer,
            report.placed_rooms,
            report.requested_rooms,
            report.locks_added,
            report.keys_placed,
            note
        );
    }

    println!(
        "{} rooms, {} connections, {} keys",
        dungeon.rooms().len(),
        dungeon.connections().len(),
        dungeon.keys().len()
    );

    match dungeon.solve() {
        Some(solution) => println!(
            "Solvable: {} rooms entered, {} keys collected, {} locks opened",
            solution.rooms_entered(),
            solution.keys_collected(),
            solution.locks_opened()
        ),
        None => println!("Not solvable"),
    }
}
