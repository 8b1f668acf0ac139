//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f32 = 1.0 / TICK_RATE as f32;

// --- Waves ---

/// Maximum number of waves that may be running at the same time.
pub const MAX_WAVES_IN_GAME: usize = 3;

/// Simulated seconds after a wave start before the next wave can become ready.
pub const MIN_WAVE_DELAY: f32 = 5.0;

// --- Projectiles ---

/// Distance at which a straight shot hits an enemy.
pub const SHOT_HIT_RADIUS: f32 = 0.4;

/// Straight shots fly this multiple of the tower range before expiring.
pub const SHOT_RANGE_FACTOR: f32 = 1.5;

/// Offset from the tower center at which projectiles appear.
pub const SHOT_SPAWN_OFFSET: f32 = 0.7;

/// Seconds a rocket launcher needs to load its next rocket.
pub const ROCKET_LOAD_TIME: f32 = 1.0;

// --- Simulation speed ---

/// Slowest accepted time scale. Use pause to stop the clock.
pub const MIN_TIME_SCALE: f64 = 0.1;
/// Fastest accepted time scale.
pub const MAX_TIME_SCALE: f64 = 4.0;

// --- Effects ---

/// Lifetime of an explosion effect in seconds.
pub const EXPLOSION_LIFETIME: f32 = 0.3;

// --- Defaults ---

/// Tower value depreciation applied after each finished wave.
pub const DEFAULT_AGE_MODIFIER: f32 = 0.97;

pub const DEFAULT_MIN_SPEED_MODIFIER: f32 = 0.05;

pub const DEFAULT_WEAK_AGAINST_MODIFIER: f32 = 3.0;

pub const DEFAULT_STRONG_AGAINST_MODIFIER: f32 = 0.33;

/// Frames in a sprite template when the config does not say otherwise.
pub const DEFAULT_ANIMATION_FRAMES: u32 = 1;

/// Animation speed (sequence cycles per second) when not configured.
pub const DEFAULT_ANIMATION_FREQUENCY: f32 = 1.0;
