#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use glam::Vec2;

    use crate::commands::PlayerCommand;
    use crate::components::{Enemy, Health};
    use crate::enums::WeaponKind;
    use crate::error::{CommandError, ConfigError};
    use crate::game_state::GameState;
    use crate::score::ScoreBoard;
    use crate::settings::{EnemyDescriptor, GameConfig};
    use crate::state::SessionState;
    use crate::types::{secs_to_ticks, Position, TickTimer, WaveId};

    // ---- Settings ----

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        config.validate().unwrap();
        assert_eq!(config.waves().len(), 4);
        assert!(config.enemy_config("blob").is_some());
        assert!(config.tower_config("canon").is_some());
        assert!(config.enemy_config("dragon").is_none());
    }

    #[test]
    fn test_config_json_round_trip_keeps_validity() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_empty_waves_rejected() {
        let mut config = GameConfig::default();
        config.waves.clear();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyWaves)));
    }

    #[test]
    fn test_empty_wave_rejected() {
        let mut config = GameConfig::default();
        config.waves[2].enemies.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyWave { wave: 2 })
        ));
    }

    #[test]
    fn test_unknown_enemy_rejected() {
        let mut config = GameConfig::default();
        config.waves[1].enemies.push(EnemyDescriptor {
            name: "dragon".into(),
            delay: 1.0,
            offset: 0.0,
            path_index: 0,
        });
        match config.validate() {
            Err(ConfigError::UnknownEnemy { wave, name }) => {
                assert_eq!(wave, 1);
                assert_eq!(name, "dragon");
            }
            other => panic!("expected UnknownEnemy, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_path_index_rejected() {
        let mut config = GameConfig::default();
        config.waves[0].enemies[0].path_index = 3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadPathIndex { path: 3, .. })
        ));
    }

    #[test]
    fn test_zero_health_enemy_rejected() {
        let mut config = GameConfig::default();
        config.enemies[0].health = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = GameConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = GameConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    // ---- ScoreBoard ----

    #[test]
    fn test_earned_credits_tracked_separately() {
        let mut score = ScoreBoard::new(100, 20);
        score.give_credits(50, true);
        score.give_credits(30, false);
        assert_eq!(score.credits(), 180);
        assert_eq!(score.credits_earned(), 50);
    }

    #[test]
    fn test_overdraft_rejected_without_change() {
        let mut score = ScoreBoard::new(100, 20);
        let err = score.take_credits(150).unwrap_err();
        assert!(matches!(
            err,
            CommandError::InsufficientCredits {
                needed: 150,
                available: 100
            }
        ));
        assert_eq!(score.credits(), 100);

        score.take_credits(100).unwrap();
        assert_eq!(score.credits(), 0);
    }

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut score = ScoreBoard::new(0, 2);
        score.take_lives(5);
        assert_eq!(score.lives(), 0);
    }

    #[test]
    fn test_bonus_listener_fires_on_change_only() {
        let mut score = ScoreBoard::new(0, 1);
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        score.on_bonus_changed(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        score.set_early_bonus(0);
        score.set_wave_bonus(0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        score.set_early_bonus(12);
        score.set_wave_bonus(40);
        score.set_wave_bonus(40);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_credit_and_life_listeners_see_new_values() {
        let mut score = ScoreBoard::new(100, 3);
        let credits = Arc::new(std::sync::Mutex::new(Vec::new()));
        let lives = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (c, l) = (credits.clone(), lives.clone());
        score.on_credits_changed(move |v| c.lock().unwrap().push(*v));
        score.on_lives_changed(move |v| l.lock().unwrap().push(*v));

        score.give_credits(0, false);
        score.give_credits(50, true);
        score.take_credits(30).unwrap();
        score.take_lives(0);
        score.take_lives(1);
        score.restore(120, 50, 2);

        assert_eq!(*credits.lock().unwrap(), vec![150, 120]);
        assert_eq!(*lives.lock().unwrap(), vec![2]);
    }

    #[test]
    fn test_restore_zeroes_bonuses() {
        let mut score = ScoreBoard::new(0, 1);
        score.set_early_bonus(12);
        score.set_wave_bonus(40);
        score.restore(300, 80, 5);
        assert_eq!(score.early_bonus(), 0);
        assert_eq!(score.wave_bonus(), 0);
        assert_eq!(score.credits(), 300);
        assert_eq!(score.credits_earned(), 80);
        assert_eq!(score.lives(), 5);
    }

    // ---- GameState ----

    #[test]
    fn test_game_state_listeners_fire_on_transitions() {
        let mut state = GameState::new();
        let started = Arc::new(AtomicUsize::new(0));
        let over = Arc::new(AtomicUsize::new(0));
        let (s, o) = (started.clone(), over.clone());
        state.on_started_changed(move |_| {
            s.fetch_add(1, Ordering::SeqCst);
        });
        state.on_over_changed(move |_| {
            o.fetch_add(1, Ordering::SeqCst);
        });

        state.set_game_started();
        state.set_game_started();
        state.set_game_over();
        state.set_game_over();
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(over.load(Ordering::SeqCst), 1);

        state.restart();
        assert_eq!(started.load(Ordering::SeqCst), 2);
        assert_eq!(over.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_game_state_restart_clears_flags() {
        let mut state = GameState::new();
        state.set_game_started();
        assert!(state.set_game_over());
        assert!(!state.set_game_over());

        state.restart();
        assert!(!state.is_started());
        assert!(!state.is_over());
        assert_eq!(state.session(), 1);
    }

    // ---- Enemy ----

    fn enemy(weak_against: Vec<WeaponKind>, strong_against: Vec<WeaponKind>) -> Enemy {
        Enemy {
            name: "soldier".into(),
            speed: 2.0,
            speed_modifier: 1.0,
            reward: 10.0,
            wave: WaveId(0),
            weak_against,
            strong_against,
        }
    }

    #[test]
    fn test_speed_modifier_stops_at_min() {
        let mut soldier = enemy(vec![], vec![]);
        soldier.modify_speed(0.5, 0.05);
        assert_eq!(soldier.current_speed(), 1.0);
        for _ in 0..10 {
            soldier.modify_speed(0.5, 0.05);
        }
        assert_eq!(soldier.speed_modifier, 0.05);
        assert!((soldier.current_speed() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_weapon_modifier() {
        let blob = enemy(vec![WeaponKind::Rocket], vec![]);
        assert_eq!(blob.weapon_modifier(WeaponKind::Rocket, 3.0, 0.33), 3.0);
        assert_eq!(blob.weapon_modifier(WeaponKind::Canon, 3.0, 0.33), 1.0);

        let sprinter = enemy(vec![], vec![WeaponKind::Canon]);
        assert_eq!(sprinter.weapon_modifier(WeaponKind::Canon, 3.0, 0.33), 0.33);

        let odd = enemy(vec![WeaponKind::Canon], vec![WeaponKind::Canon]);
        assert!((odd.weapon_modifier(WeaponKind::Canon, 3.0, 0.33) - 0.99).abs() < 1e-6);
    }

    // ---- Types ----

    #[test]
    fn test_secs_to_ticks_rounds_up() {
        assert_eq!(secs_to_ticks(5.0), 150);
        assert_eq!(secs_to_ticks(0.01), 1);
        assert_eq!(secs_to_ticks(0.0), 0);
        assert_eq!(secs_to_ticks(-3.0), 0);
    }

    #[test]
    fn test_tick_timer_fires_once_per_interval() {
        let mut timer = TickTimer::create_interval(0.1); // 3 ticks
        let fired: Vec<bool> = (0..7).map(|_| timer.tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
    }

    #[test]
    fn test_tick_timer_never_slower_than_one_tick() {
        let mut timer = TickTimer::create_interval(0.0);
        assert!(timer.tick());
        assert!(timer.tick());
    }

    #[test]
    fn test_health_reports_lethal_hit_once() {
        let mut health = Health::new(100.0);
        assert!(!health.damage(60.0));
        assert!(health.damage(60.0));
        assert!(!health.damage(10.0));
        assert!(health.is_dead());
    }

    #[test]
    fn test_position_angle_and_direction() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.0, 2.0);
        assert!((a.angle_to(&b) - 90.0).abs() < 1e-4);
        assert_eq!(a.direction_to(&b), Vec2::Y);
        assert_eq!(a.direction_to(&a), Vec2::ZERO);
    }

    // ---- Wire formats ----

    #[test]
    fn test_command_uses_type_tag() {
        let cmd = PlayerCommand::BuildTower {
            tower: "canon".into(),
            position: Vec2::new(1.0, 2.0),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "BuildTower");
        assert_eq!(json["position"], serde_json::json!([1.0, 2.0]));

        let back: PlayerCommand = serde_json::from_value(json).unwrap();
        assert_eq!(back, cmd);
    }

    #[test]
    fn test_session_state_parses_plain_values() {
        let state: SessionState = serde_json::from_str(
            r#"{"tick_count":10,"next_entity_id":4,"wave_number":2,"credits":5,"credits_earned":7,"lives":3}"#,
        )
        .unwrap();
        assert_eq!(state.wave_number, 2);
        assert_eq!(state.credits_earned, 7);
    }
}
