//! Monoman headless tools
//!
//! Usage:
//!   monoman inspect level.lvl              # Print a level's header and contents
//!   monoman pack level.json out.lvl        # Encode a JSON level description
//!   monoman run --levels dir [--script inputs.json] [--ticks N]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use monoman::audio::{AudioManager, LogSink};
use monoman::level::{self, LevelData, LevelDir, LevelSource};
use monoman::sim::TickInput;
use monoman::{LevelPhase, Session, Settings, Snapshot, Tuning};

/// Ticks simulated when neither a script nor `--ticks` is given
const DEFAULT_TICKS: usize = 600;

#[derive(Parser)]
#[command(name = "monoman")]
#[command(about = "Monochrome platformer level tools and headless simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a .lvl file and print its contents
    Inspect {
        file: PathBuf,
    },
    /// Encode a JSON level description into a .lvl file
    Pack {
        input: PathBuf,
        output: PathBuf,
    },
    /// Play through a level directory with scripted input
    Run {
        /// Directory holding 0.lvl, 1.lvl, ...
        #[arg(long)]
        levels: PathBuf,
        /// JSON array of per-tick inputs
        #[arg(long)]
        script: Option<PathBuf>,
        /// Number of ticks to simulate (defaults to the script length)
        #[arg(long)]
        ticks: Option<usize>,
        /// Gameplay tuning overrides
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Player settings
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Decoration RNG seed
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Pack { input, output } => pack(&input, &output),
        Commands::Run {
            levels,
            script,
            ticks,
            tuning,
            settings,
            seed,
        } => run(&levels, script.as_deref(), ticks, tuning.as_deref(), settings.as_deref(), seed),
    }
}

fn inspect(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let level = level::decode(&bytes).with_context(|| format!("Failed to decode {}", file.display()))?;

    println!("title:      {}", level.title);
    println!("background: {:?}", level.background);
    println!("wrapping:   {}", level.wrapping);
    if let Some(player) = level.player() {
        println!("player:     ({}, {})", player.cell.column, player.cell.row);
    }
    for (kind, count) in level.kind_counts() {
        println!("  {kind:<10} {count}");
    }
    Ok(())
}

fn pack(input: &Path, output: &Path) -> Result<()> {
    let json = std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))?;
    let level: LevelData =
        serde_json::from_str(&json).with_context(|| format!("Invalid level description {}", input.display()))?;
    let bytes = level::encode(&level).with_context(|| format!("Failed to encode '{}'", level.title))?;
    std::fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Packed '{}' into {} ({} bytes)", level.title, output.display(), bytes.len());
    Ok(())
}

fn run(
    levels: &Path,
    script: Option<&Path>,
    ticks: Option<usize>,
    tuning: Option<&Path>,
    settings: Option<&Path>,
    seed: u64,
) -> Result<()> {
    let source = LevelDir::open(levels).context("Failed to open level directory")?;
    if source.is_empty() {
        anyhow::bail!("No .lvl files in {}", levels.display());
    }

    let tuning = match tuning {
        Some(path) => Tuning::load(path).context("Failed to load tuning")?,
        None => Tuning::default(),
    };
    let settings = settings.map(Settings::load).unwrap_or_default();

    let inputs: Vec<TickInput> = match script {
        Some(path) => {
            let json =
                std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&json).with_context(|| format!("Invalid input script {}", path.display()))?
        }
        None => Vec::new(),
    };
    let ticks = ticks.unwrap_or(if inputs.is_empty() { DEFAULT_TICKS } else { inputs.len() });

    let mut audio = AudioManager::new(LogSink);
    audio.set_muted(!settings.audio_enabled);

    let mut session = Session::new(source, tuning, seed);
    session.start().context("Failed to start session")?;

    for i in 0..ticks {
        let input = inputs.get(i).copied().unwrap_or_default();
        let report = session.step(&input).with_context(|| format!("Tick {i} failed"))?;
        audio.play_all(report.sounds());
        if session.phase() == LevelPhase::Ended {
            break;
        }
    }

    let snapshot = Snapshot::capture(&session, &settings);
    log::info!(
        "Final frame: {} sprites, {} texts",
        snapshot.sprites.len(),
        snapshot.texts.len()
    );
    println!("{}", session.summary());
    Ok(())
}
