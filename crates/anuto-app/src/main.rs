//! Headless Anuto runner.
//!
//! Builds the requested towers, calls waves as soon as they are ready and
//! prints the final session state as JSON once every called wave is over.
//!
//! Usage:
//!   anuto --waves 5 --tower canon:3,3 --tower rocket_launcher:8,5
//!   RUST_LOG=anuto_sim=debug anuto --settings settings.json

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::info;

use anuto_core::commands::PlayerCommand;
use anuto_core::settings::GameConfig;
use anuto_sim::{spawn_game_loop, SimConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Parser)]
#[command(name = "anuto")]
#[command(about = "Run a headless Anuto tower defense session")]
struct Args {
    /// Settings JSON file. Built-in settings are used when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Simulation speed (1.0 = real time)
    #[arg(long, default_value_t = 4.0)]
    time_scale: f64,

    /// Number of waves to call
    #[arg(long, default_value_t = 5)]
    waves: u32,

    /// Tower to build before the first wave, as `name:x,y`
    #[arg(long = "tower", value_parser = parse_tower)]
    towers: Vec<TowerPlacement>,
}

#[derive(Debug, Clone)]
struct TowerPlacement {
    name: String,
    position: Vec2,
}

fn parse_tower(value: &str) -> Result<TowerPlacement, String> {
    let (name, coords) = value
        .split_once(':')
        .ok_or_else(|| format!("expected `name:x,y`, got `{value}`"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{coords}`"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(TowerPlacement {
        name: name.to_string(),
        position: Vec2::new(x, y),
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.settings {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => GameConfig::default(),
    };

    let game_loop = spawn_game_loop(
        config,
        SimConfig {
            seed: args.seed,
            time_scale: args.time_scale,
        },
    )
    .context("starting the game loop")?;
    let handle = game_loop.handle();

    for tower in &args.towers {
        handle.send_command(PlayerCommand::BuildTower {
            tower: tower.name.clone(),
            position: tower.position,
        })?;
    }

    let mut last_wave = 0;
    loop {
        thread::sleep(POLL_INTERVAL);
        let Some(snapshot) = handle.latest_snapshot() else {
            continue;
        };

        if snapshot.game_over {
            info!(wave_number = snapshot.waves.wave_number, "game over");
            break;
        }
        if snapshot.waves.wave_number != last_wave {
            last_wave = snapshot.waves.wave_number;
            info!(
                wave_number = last_wave,
                credits = snapshot.economy.credits,
                lives = snapshot.economy.lives,
                "wave called"
            );
        }

        let all_called = snapshot.waves.wave_number >= args.waves;
        if all_called && snapshot.waves.active_waves == 0 {
            break;
        }
        // A stale snapshot may repeat the call; the loop ignores it when not ready
        if !all_called && snapshot.waves.next_wave_ready {
            handle.start_next_wave()?;
        }
    }

    let (tx, rx) = mpsc::channel();
    handle.post(move |engine| {
        let _ = tx.send(engine.session_state());
        Ok(())
    })?;
    let session = rx
        .recv_timeout(Duration::from_secs(5))
        .map_err(|e| anyhow!("game loop did not answer: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&session)?);
    game_loop.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tower() {
        let tower = parse_tower("canon:3,4.5").unwrap();
        assert_eq!(tower.name, "canon");
        assert_eq!(tower.position, Vec2::new(3.0, 4.5));
    }

    #[test]
    fn test_parse_tower_rejects_missing_coords() {
        assert!(parse_tower("canon").is_err());
        assert!(parse_tower("canon:3").is_err());
        assert!(parse_tower("canon:a,1").is_err());
    }
}
