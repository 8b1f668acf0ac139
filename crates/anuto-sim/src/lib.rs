//! Simulation engine for Anuto.
//!
//! Owns the hecs entity registry, drains posted work, advances waves and
//! entities at a fixed tick rate, and produces `GameStateSnapshot`s for
//! observers on other threads.

pub mod components;
pub mod difficulty;
pub mod engine;
pub mod game_loop;
pub mod registry;
pub mod scheduler;
pub mod static_data;
pub mod systems;
pub mod wave_attender;
pub mod wave_manager;
pub mod world_setup;

pub use anuto_core as core;
pub use engine::{SimConfig, SimulationEngine};
pub use game_loop::{spawn_game_loop, EngineHandle, GameLoop};
