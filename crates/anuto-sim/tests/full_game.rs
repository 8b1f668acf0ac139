use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;

use anuto_core::commands::PlayerCommand;
use anuto_core::events::GameEvent;
use anuto_core::settings::{GameConfig, PathDescriptor};
use anuto_sim::wave_attender::WaveAttender;
use anuto_sim::{spawn_game_loop, SimConfig, SimulationEngine};

fn new_engine(seed: u64) -> SimulationEngine {
    SimulationEngine::new(GameConfig::default(), SimConfig { seed, time_scale: 1.0 }).unwrap()
}

/// Two canons along the default path, waves called whenever they are ready.
fn autoplay(engine: &mut SimulationEngine, ticks: usize) -> Vec<GameEvent> {
    engine.queue_commands([
        PlayerCommand::BuildTower {
            tower: "canon".into(),
            position: Vec2::new(3.0, 3.0),
        },
        PlayerCommand::BuildTower {
            tower: "canon".into(),
            position: Vec2::new(7.0, 5.0),
        },
    ]);

    let mut events = Vec::new();
    for _ in 0..ticks {
        if engine.waves().is_next_wave_ready() {
            engine.queue_command(PlayerCommand::StartNextWave);
        }
        let snapshot = engine.tick();
        events.extend(snapshot.events);
    }
    events
}

#[test]
fn test_autoplay_remaining_enemies_match_active_waves() {
    let mut engine = new_engine(1);
    engine.queue_command(PlayerCommand::BuildTower {
        tower: "canon".into(),
        position: Vec2::new(3.0, 3.0),
    });

    for _ in 0..3000 {
        if engine.waves().is_next_wave_ready() {
            engine.queue_command(PlayerCommand::StartNextWave);
        }
        let snapshot = engine.tick();

        let expected: u32 = engine
            .waves()
            .active_waves()
            .iter()
            .map(WaveAttender::remaining_enemies_count)
            .sum();
        assert_eq!(snapshot.waves.remaining_enemies, expected);
        assert!(snapshot.enemies.len() as u32 <= snapshot.waves.remaining_enemies);
        assert!(snapshot.waves.active_waves as usize <= 3);
    }
    assert!(engine.waves().wave_number() > 3);
}

#[test]
fn test_autoplay_finishes_each_wave_once() {
    let mut engine = new_engine(5);
    let events = autoplay(&mut engine, 3000);

    let mut finished: Vec<u32> = events
        .iter()
        .filter_map(|event| match event {
            GameEvent::WaveFinished { wave_number } => Some(*wave_number),
            _ => None,
        })
        .collect();
    assert!(!finished.is_empty());
    let count = finished.len();
    finished.sort_unstable();
    finished.dedup();
    assert_eq!(finished.len(), count);

    let kills = events
        .iter()
        .filter(|event| matches!(event, GameEvent::EnemyKilled { .. }))
        .count();
    assert!(kills > 0, "canons along the path should kill something");
}

#[test]
fn test_autoplay_is_deterministic() {
    let mut engine_a = new_engine(99);
    let mut engine_b = new_engine(99);
    autoplay(&mut engine_a, 2000);
    autoplay(&mut engine_b, 2000);

    assert_eq!(engine_a.session_state(), engine_b.session_state());
    let json_a = serde_json::to_string(&engine_a.snapshot()).unwrap();
    let json_b = serde_json::to_string(&engine_b.snapshot()).unwrap();
    assert_eq!(json_a, json_b);
}

#[test]
fn test_threaded_loop_plays_a_wave() {
    let mut config = GameConfig::default();
    config.enemies[0].speed = 10.0;
    config.paths = vec![PathDescriptor {
        waypoints: vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)],
    }];
    config.waves.truncate(1);

    let game_loop = spawn_game_loop(
        config,
        SimConfig {
            seed: 3,
            time_scale: 4.0,
        },
    )
    .unwrap();
    let handle = game_loop.handle();
    handle.start_next_wave().unwrap();

    // 3 soldiers released over 2 simulated seconds
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut done = false;
    while Instant::now() < deadline {
        let (tx, rx) = mpsc::channel();
        handle
            .post(move |engine| {
                let waves = engine.waves();
                let _ = tx.send((waves.wave_number(), waves.active_wave_count()));
                Ok(())
            })
            .unwrap();
        let (wave_number, active) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        if wave_number == 1 && active == 0 {
            done = true;
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }
    assert!(done);

    let snapshot = handle.latest_snapshot().unwrap();
    assert_eq!(snapshot.economy.lives, 20 - 3);
    game_loop.shutdown();
}
