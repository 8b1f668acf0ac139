//! Core types and definitions for the Anuto simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! settings, components, commands, state snapshots, events, errors and
//! constants. It has no dependency on the engine or any runtime framework.

pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod game_state;
pub mod observable;
pub mod score;
pub mod settings;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
