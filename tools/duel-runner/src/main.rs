//! duel-runner: headless match driver for the combat engine.
//!
//! Plays a match with scripted bots in both seats and prints a JSON summary.
//!
//! Usage:
//!   duel-runner --mode vs-boss --seed 7 --ticks 20000
//!   duel-runner --config arena.json --snapshot

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;

use tankduel_core::commands::{FrameInput, PlayerCommand, TankInput};
use tankduel_core::config::ArenaConfig;
use tankduel_core::enums::{BossArchetype, ControlScheme, GameMode, GamePhase, PlayerSlot};
use tankduel_core::state::ArenaSnapshot;
use tankduel_sim::CombatEngine;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Pvp,
    VsBoss,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Pvp => GameMode::Pvp,
            ModeArg::VsBoss => GameMode::VsBoss,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BossArg {
    Juggernaut,
    Marksman,
    Broodmother,
    Splitter,
    Revenant,
}

impl From<BossArg> for BossArchetype {
    fn from(boss: BossArg) -> Self {
        match boss {
            BossArg::Juggernaut => BossArchetype::Juggernaut,
            BossArg::Marksman => BossArchetype::Marksman,
            BossArg::Broodmother => BossArchetype::Broodmother,
            BossArg::Splitter => BossArchetype::Splitter,
            BossArg::Revenant => BossArchetype::Revenant,
        }
    }
}

#[derive(Parser)]
#[command(name = "duel-runner")]
#[command(about = "Run a headless tank duel with scripted bots and report the outcome")]
struct Args {
    /// Arena config JSON; command-line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Match mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// First boss in boss mode
    #[arg(long, value_enum)]
    boss: Option<BossArg>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks to simulate
    #[arg(long, default_value_t = 36_000)]
    ticks: u64,

    /// Frame time per tick in milliseconds
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    dt: f64,

    /// Stop after this many bosses are defeated in boss mode
    #[arg(long, default_value_t = 3)]
    boss_goal: u32,

    /// Include the final snapshot in the summary
    #[arg(long)]
    snapshot: bool,
}

#[derive(Serialize)]
struct RunSummary {
    mode: GameMode,
    seed: u64,
    ticks: u64,
    sim_time_ms: f64,
    phase: GamePhase,
    round: u32,
    scores: [u32; 2],
    winner: Option<PlayerSlot>,
    bosses_defeated: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<ArenaSnapshot>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be a positive frame time, got {}", args.dt);
    }
    let config = load_config(&args)?;
    info!(
        "running {:?} match, seed {}, up to {} ticks",
        config.mode, config.seed, args.ticks
    );

    let mut engine = CombatEngine::new(config);
    engine.queue_command(PlayerCommand::StartMatch);

    let mut ticks = 0;
    let mut last = None;
    while ticks < args.ticks {
        let snapshot = engine.tick(args.dt, &bot_input(ticks));
        ticks += 1;
        last = Some(snapshot);
        if is_finished(&engine, args.boss_goal) {
            break;
        }
    }

    info!(
        "finished after {} ticks: round {}, scores {:?}, bosses defeated {}",
        ticks,
        engine.round(),
        engine.scores(),
        engine.bosses_defeated()
    );

    let summary = RunSummary {
        mode: engine.config().mode,
        seed: engine.config().seed,
        ticks,
        sim_time_ms: engine.clock().now_ms,
        phase: engine.phase(),
        round: engine.round(),
        scores: engine.scores(),
        winner: engine.winner(),
        bosses_defeated: engine.bosses_defeated(),
        snapshot: last.filter(|_| args.snapshot),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serializing run summary")?
    );
    Ok(())
}

fn load_config(args: &Args) -> Result<ArenaConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading arena config {}", path.display()))?;
            ArenaConfig::from_json(&json)
                .with_context(|| format!("parsing arena config {}", path.display()))?
        }
        None => ArenaConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(boss) = args.boss {
        config.boss_archetype = boss.into();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    // Bots steer with the auto-aim scheme.
    config.control_schemes = [ControlScheme::Focus; 2];
    config.validate().context("arena config rejected")?;
    Ok(config)
}

fn is_finished(engine: &CombatEngine, boss_goal: u32) -> bool {
    match engine.phase() {
        GamePhase::MatchOver => true,
        _ => engine.config().mode == GameMode::VsBoss && engine.bosses_defeated() >= boss_goal,
    }
}

/// Scripted strafing bots. Seat two runs the same pattern shifted in time
/// so the seats do not mirror each other.
fn bot_input(tick: u64) -> FrameInput {
    FrameInput {
        players: [bot(tick), bot(tick + 97)],
    }
}

fn bot(tick: u64) -> TankInput {
    let leg = (tick / 45) % 8;
    TankInput {
        forward: matches!(leg, 0 | 1 | 4),
        back: matches!(leg, 5 | 6),
        left: matches!(leg, 1 | 2 | 6),
        right: matches!(leg, 3 | 4 | 7),
        // Short taps plus one long hold per cycle for charged shots.
        fire: tick % 30 < 2 || (tick % 360) >= 300,
    }
}
