//! Per-type static data shared by all entities of that type.
//!
//! Sprite templates are built lazily the first time an entity of a type is
//! initialised and then shared through `Arc`. Each entity gets its own
//! `Animation` state pointing at the shared template. The cache belongs to
//! the session and is cleared on restart.

use std::collections::HashMap;
use std::sync::Arc;

use anuto_core::settings::AnimationConfig;

/// Immutable sprite sequence parameters for one entity type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteTemplate {
    pub frames: u32,
    /// Full sequence cycles per second.
    pub frequency: f32,
}

impl From<AnimationConfig> for SpriteTemplate {
    fn from(config: AnimationConfig) -> Self {
        Self {
            frames: config.frames.max(1),
            frequency: config.frequency.max(0.0),
        }
    }
}

#[derive(Debug, Default)]
pub struct StaticDataCache {
    templates: HashMap<String, Arc<SpriteTemplate>>,
    /// Number of templates built since the cache was created.
    builds: usize,
}

impl StaticDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared template for `key`, building it with `build` on first use.
    pub fn get_or_build(
        &mut self,
        key: &str,
        build: impl FnOnce() -> SpriteTemplate,
    ) -> Arc<SpriteTemplate> {
        if let Some(template) = self.templates.get(key) {
            return Arc::clone(template);
        }
        let template = Arc::new(build());
        self.builds += 1;
        self.templates.insert(key.to_string(), Arc::clone(&template));
        template
    }

    pub fn clear(&mut self) {
        self.templates.clear();
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn builds(&self) -> usize {
        self.builds
    }
}

pub fn enemy_key(name: &str) -> String {
    format!("enemy:{name}")
}

pub fn tower_key(name: &str) -> String {
    format!("tower:{name}")
}

pub const SHOT_KEY: &str = "projectile:shot";
pub const ROCKET_KEY: &str = "projectile:rocket";
pub const EXPLOSION_KEY: &str = "effect:explosion";

/// Per-entity animation instance of a shared template.
#[derive(Debug, Clone)]
pub struct Animation {
    pub template: Arc<SpriteTemplate>,
    pub frame: u32,
    elapsed: f32,
    /// Sprite variant chosen when the entity was created.
    pub variant: u32,
}

impl Animation {
    pub fn new(template: Arc<SpriteTemplate>, variant: u32) -> Self {
        Self {
            template,
            frame: 0,
            elapsed: 0.0,
            variant,
        }
    }

    /// Advance by `dt` seconds of simulated time.
    pub fn tick(&mut self, dt: f32) {
        let template = &self.template;
        if template.frames <= 1 || template.frequency <= 0.0 {
            return;
        }
        let period = 1.0 / template.frequency;
        self.elapsed = (self.elapsed + dt) % period;
        let frame = (self.elapsed / period * template.frames as f32) as u32;
        self.frame = frame.min(template.frames - 1);
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_built_once_and_shared() {
        let mut cache = StaticDataCache::new();
        let mut calls = 0;
        let a = cache.get_or_build("enemy:blob", || {
            calls += 1;
            SpriteTemplate {
                frames: 4,
                frequency: 1.0,
            }
        });
        let b = cache.get_or_build("enemy:blob", || unreachable!());
        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear_forces_rebuild() {
        let mut cache = StaticDataCache::new();
        let template = || SpriteTemplate {
            frames: 2,
            frequency: 1.0,
        };
        let a = cache.get_or_build("tower:canon", template);
        cache.clear();
        assert!(cache.is_empty());
        let b = cache.get_or_build("tower:canon", template);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 2);
    }

    #[test]
    fn test_animation_cycles_through_frames() {
        let template = Arc::new(SpriteTemplate {
            frames: 4,
            frequency: 1.0,
        });
        let mut animation = Animation::new(template, 0);
        animation.tick(0.3);
        assert_eq!(animation.frame(), 1);
        animation.tick(0.5);
        assert_eq!(animation.frame(), 3);
        animation.tick(0.3);
        assert_eq!(animation.frame(), 0);
    }
}
