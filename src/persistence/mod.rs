//! Leaderboard storage
//!
//! The leaderboard is the only persisted artifact. Every save replaces the
//! previous list in full:
//! - JSON array of `{ "initials": "AAA", "score": 80 }` records
//! - Packed `"AAA......80"` strings are accepted on load
//! - File saves go through a temp file and a rename

use std::path::PathBuf;

use crate::error::StoreError;
use crate::leaderboard::LeaderboardEntry;

/// Injected load/save capability for the leaderboard
pub trait LeaderboardStore {
    fn load(&self) -> Result<Vec<LeaderboardEntry>, StoreError>;
    fn save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StoreError>;
}

/// Parse a stored leaderboard
pub fn parse_entries(json: &str) -> Result<Vec<LeaderboardEntry>, StoreError> {
    Ok(serde_json::from_str(json)?)
}

/// In-memory store holding the serialized list
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    json: Option<String>,
}

impl MemoryStore {
    /// Store pre-seeded with raw JSON (which may be malformed)
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            json: Some(json.into()),
        }
    }

    pub fn raw(&self) -> Option<&str> {
        self.json.as_deref()
    }
}

impl LeaderboardStore for MemoryStore {
    fn load(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        match &self.json {
            Some(json) => parse_entries(json),
            None => Ok(Vec::new()),
        }
    }

    fn save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        self.json = Some(serde_json::to_string(entries)?);
        Ok(())
    }
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LeaderboardStore for JsonFileStore {
    fn load(&self) -> Result<Vec<LeaderboardEntry>, StoreError> {
        if !self.path.exists() {
            log::info!("No leaderboard at {}, starting fresh", self.path.display());
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        parse_entries(&json)
    }

    fn save(&mut self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
