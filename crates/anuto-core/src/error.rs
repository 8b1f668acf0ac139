//! Error taxonomy shared by the settings loader, the engine and the loop.
//!
//! Configuration problems are fatal at session start. Command errors abort a
//! single work item and never stop the simulation. Stale entity references
//! are not errors at all; the engine treats them as absent.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed or inconsistent game settings. Raised while loading or when an
/// engine is constructed; a session cannot start with one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no waves configured")]
    EmptyWaves,
    #[error("wave {wave} has no enemies")]
    EmptyWave { wave: usize },
    #[error("wave {wave} references unknown enemy `{name}`")]
    UnknownEnemy { wave: usize, name: String },
    #[error("no enemy paths configured")]
    NoPaths,
    #[error("path {index} needs at least two waypoints")]
    ShortPath { index: usize },
    #[error("wave {wave} enemy `{name}` uses path {path}, only {available} paths exist")]
    BadPathIndex {
        wave: usize,
        name: String,
        path: usize,
        available: usize,
    },
    #[error("duplicate {what} name `{name}`")]
    DuplicateName { what: &'static str, name: String },
    #[error("invalid setting `{name}`: {reason}")]
    InvalidSetting { name: String, reason: String },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidSetting {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of one posted work item or player command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("not enough credits: need {needed}, have {available}")]
    InsufficientCredits { needed: u32, available: u32 },
    #[error("unknown tower type `{0}`")]
    UnknownTower(String),
    #[error("no tower with id {0}")]
    UnknownEntity(u32),
    #[error("game is over")]
    GameOver,
    #[error("work item panicked: {0}")]
    Panicked(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Failures of the simulation loop thread and its handles.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("simulation loop is not running")]
    Disconnected,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(#[from] std::io::Error),
}
