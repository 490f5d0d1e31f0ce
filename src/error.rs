//! Error types
//!
//! Only configuration errors are fatal. Storage errors are recovered by the
//! leaderboard (empty board on load failure, logged warning on save failure).

use std::path::PathBuf;

/// Rejected configuration
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("field width must be a positive finite number, got {0}")]
    InvalidFieldWidth(f32),

    #[error("field height must be a positive finite number, got {0}")]
    InvalidFieldHeight(f32),

    #[error("move speed must be a positive finite number, got {0}")]
    InvalidMoveSpeed(f64),

    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Leaderboard storage failure
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("leaderboard I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed leaderboard data: {0}")]
    Json(#[from] serde_json::Error),
}
