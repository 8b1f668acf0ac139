//! Adaptive difficulty: wave iteration, extension and the health/reward
//! modifiers derived from what the player has earned so far.

use anuto_core::error::ConfigError;
use anuto_core::settings::{GameConfig, GameSettings, WaveDescriptor};

/// 1-based pass over the wave list that `wave_index` belongs to.
pub fn iteration_number(wave_index: u32, wave_count: usize) -> Result<u32, ConfigError> {
    if wave_count == 0 {
        return Err(ConfigError::EmptyWaves);
    }
    Ok(wave_index / wave_count as u32 + 1)
}

/// Extra repetitions of the enemy list for this pass, capped at `max_extend`.
pub fn wave_extend(iteration: u32, descriptor: &WaveDescriptor) -> u32 {
    iteration
        .saturating_sub(1)
        .saturating_mul(descriptor.extend)
        .min(descriptor.max_extend)
}

/// Base health of every enemy wave `descriptor_index` will spawn, before
/// modifiers.
pub fn wave_health(config: &GameConfig, descriptor_index: usize, extend: u32) -> Result<f32, ConfigError> {
    let descriptor = config
        .waves()
        .get(descriptor_index)
        .ok_or(ConfigError::EmptyWaves)?;
    let mut health = 0.0;
    for entry in &descriptor.enemies {
        let enemy = config
            .enemy_config(&entry.name)
            .ok_or_else(|| ConfigError::UnknownEnemy {
                wave: descriptor_index,
                name: entry.name.clone(),
            })?;
        health += enemy.health;
    }
    Ok(health * (extend + 1) as f32)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveModifiers {
    pub damage_possible: f32,
    pub health: f32,
    pub reward: f32,
}

pub fn wave_modifiers(settings: &GameSettings, credits_earned: u32, wave_health: f32) -> WaveModifiers {
    let earned = credits_earned as f32;
    let damage_possible = settings.difficulty_linear * earned
        + settings.difficulty_modifier * earned.powf(settings.difficulty_exponent);

    let health = if wave_health > 0.0 {
        damage_possible / wave_health
    } else {
        0.0
    };
    let health = health.max(settings.min_health_modifier);

    let reward = (settings.reward_modifier * health.powf(settings.reward_exponent))
        .max(settings.min_reward_modifier);

    WaveModifiers {
        damage_possible,
        health,
        reward,
    }
}

/// Bonus for calling a wave while `remaining_reward` credits of enemies
/// are still out.
pub fn early_bonus(settings: &GameSettings, remaining_reward: f32) -> u32 {
    let bonus = settings.early_modifier * remaining_reward.max(0.0).powf(settings.early_exponent);
    bonus.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> GameSettings {
        GameConfig::default().settings
    }

    #[test]
    fn test_iteration_cycles_over_descriptors() {
        assert_eq!(iteration_number(0, 4).unwrap(), 1);
        assert_eq!(iteration_number(3, 4).unwrap(), 1);
        assert_eq!(iteration_number(4, 4).unwrap(), 2);
        assert_eq!(iteration_number(9, 4).unwrap(), 3);
        assert!(matches!(iteration_number(0, 0), Err(ConfigError::EmptyWaves)));
    }

    #[test]
    fn test_extend_grows_per_iteration_and_caps() {
        let mut descriptor = GameConfig::default().waves[0].clone();
        descriptor.extend = 2;
        descriptor.max_extend = 5;
        assert_eq!(wave_extend(1, &descriptor), 0);
        assert_eq!(wave_extend(2, &descriptor), 2);
        assert_eq!(wave_extend(3, &descriptor), 4);
        assert_eq!(wave_extend(4, &descriptor), 5);
    }

    #[test]
    fn test_wave_health_scales_with_extend() {
        let config = GameConfig::default();
        // three soldiers at 300
        assert_eq!(wave_health(&config, 0, 0).unwrap(), 900.0);
        assert_eq!(wave_health(&config, 0, 2).unwrap(), 2700.0);
    }

    #[test]
    fn test_modifiers_clamped_to_minimums_without_earnings() {
        let modifiers = wave_modifiers(&settings(), 0, 900.0);
        assert_eq!(modifiers.damage_possible, 0.0);
        assert_eq!(modifiers.health, 0.5);
        // 0.4 * sqrt(0.5) = 0.283 < 0.5
        assert_eq!(modifiers.reward, 0.5);
    }

    #[test]
    fn test_modifiers_follow_earnings() {
        // 2 * 400 + 8 * sqrt(400) = 960
        let modifiers = wave_modifiers(&settings(), 400, 480.0);
        assert!((modifiers.damage_possible - 960.0).abs() < 1e-3);
        assert!((modifiers.health - 2.0).abs() < 1e-5);
        // max(0.4 * sqrt(2), 0.5) = 0.5657
        assert!((modifiers.reward - 0.4 * 2f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_modifiers_never_below_minimums() {
        let settings = settings();
        let healths = [0.0, 1.0, 50.0, 900.0, 2700.0, 1.0e6];
        for credits_earned in (0..=5000).step_by(125) {
            for &wave_health in &healths {
                let modifiers = wave_modifiers(&settings, credits_earned, wave_health);
                assert!(
                    modifiers.health >= settings.min_health_modifier,
                    "health {} at earned={credits_earned} wave_health={wave_health}",
                    modifiers.health
                );
                assert!(
                    modifiers.reward >= settings.min_reward_modifier,
                    "reward {} at earned={credits_earned} wave_health={wave_health}",
                    modifiers.reward
                );
            }
        }
    }

    #[test]
    fn test_early_bonus_rounds() {
        let settings = settings();
        assert_eq!(early_bonus(&settings, 0.0), 0);
        assert_eq!(early_bonus(&settings, 100.0), 10);
        assert_eq!(early_bonus(&settings, 30.0), 5); // sqrt(30) = 5.48
    }
}
