//! Top-10 leaderboard
//!
//! Ranked by score descending. Equal scores keep their submission order, so a
//! new entry loses ties against scores already on the board.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::persistence::LeaderboardStore;

/// Maximum number of entries kept
pub const MAX_ENTRIES: usize = 10;

/// Width the score is padded to when displayed
const SCORE_DISPLAY_WIDTH: usize = 8;

/// Three uppercase letters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Initials([u8; 3]);

impl Initials {
    pub const LEN: usize = 3;

    pub fn as_str(&self) -> &str {
        // Constructed only from ASCII uppercase bytes
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl TryFrom<&str> for Initials {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let bytes = s.as_bytes();
        if bytes.len() != Self::LEN || !bytes.iter().all(u8::is_ascii_uppercase) {
            return Err(format!("initials must be three letters A-Z, got {s:?}"));
        }
        Ok(Self([bytes[0], bytes[1], bytes[2]]))
    }
}

impl TryFrom<String> for Initials {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_from(s.as_str())
    }
}

impl From<Initials> for String {
    fn from(initials: Initials) -> Self {
        initials.as_str().to_string()
    }
}

impl fmt::Display for Initials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry")]
pub struct LeaderboardEntry {
    pub initials: Initials,
    pub score: u64,
}

impl LeaderboardEntry {
    pub fn new(initials: Initials, score: u64) -> Self {
        Self { initials, score }
    }

    /// Parse the packed `"AAA......80"` form: initials, then the score padded
    /// with dots. A missing trailing number reads as 0.
    pub fn from_packed(packed: &str) -> Result<Self, String> {
        let initials = packed
            .get(..Initials::LEN)
            .ok_or_else(|| format!("packed entry too short: {packed:?}"))?;
        let initials = Initials::try_from(initials)?;
        let digits_start = packed
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
            .max(Initials::LEN);
        let digits = &packed[digits_start..];
        let score = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|e| format!("bad score in {packed:?}: {e}"))?
        };
        Ok(Self { initials, score })
    }

    /// Score left-padded with dots, e.g. `".....120"`
    pub fn padded_score(&self) -> String {
        format!("{:.>width$}", self.score, width = SCORE_DISPLAY_WIDTH)
    }
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.initials, self.padded_score())
    }
}

/// On-disk shapes accepted for an entry
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Record { initials: Initials, score: u64 },
    Packed(String),
}

impl TryFrom<StoredEntry> for LeaderboardEntry {
    type Error = String;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        match stored {
            StoredEntry::Record { initials, score } => Ok(Self { initials, score }),
            StoredEntry::Packed(packed) => Self::from_packed(&packed),
        }
    }
}

/// Result of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// The board after the submission
    pub entries: Vec<LeaderboardEntry>,
    /// The new entry ranks first
    pub is_new_top: bool,
    /// Rank achieved (1-indexed), None if the entry fell off the board
    pub rank: Option<usize>,
}

/// Ranked leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded entries, restoring order and length
    pub fn from_entries(mut entries: Vec<LeaderboardEntry>) -> Self {
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(MAX_ENTRIES);
        Self { entries }
    }

    /// Load from a store. Anything unreadable yields an empty board.
    pub fn load_or_empty(store: &dyn LeaderboardStore) -> Self {
        match store.load() {
            Ok(entries) => {
                log::info!("Loaded {} leaderboard entries", entries.len());
                Self::from_entries(entries)
            }
            Err(e) => {
                log::warn!("Leaderboard unreadable, starting empty: {e}");
                Self::new()
            }
        }
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Rank a new score against the board and keep the top entries
    pub fn submit(&mut self, initials: Initials, score: u64) -> SubmitOutcome {
        let mut ranked: Vec<(bool, LeaderboardEntry)> =
            self.entries.drain(..).map(|e| (false, e)).collect();
        ranked.push((true, LeaderboardEntry::new(initials, score)));

        // Stable: earlier entries win ties
        ranked.sort_by(|a, b| b.1.score.cmp(&a.1.score));

        let position = ranked.iter().position(|(is_new, _)| *is_new);
        ranked.truncate(MAX_ENTRIES);
        self.entries = ranked.into_iter().map(|(_, e)| e).collect();

        let rank = position.filter(|&i| i < MAX_ENTRIES).map(|i| i + 1);
        SubmitOutcome {
            entries: self.entries.clone(),
            is_new_top: position == Some(0),
            rank,
        }
    }

    /// Submit, then write the whole board back to the store
    pub fn submit_and_save(
        &mut self,
        initials: Initials,
        score: u64,
        store: &mut dyn LeaderboardStore,
    ) -> SubmitOutcome {
        let outcome = self.submit(initials, score);
        match store.save(&self.entries) {
            Ok(()) => log::info!("Leaderboard saved ({} entries)", self.entries.len()),
            Err(e) => log::warn!("Leaderboard save failed: {e}"),
        }
        outcome
    }

    /// Display lines, e.g. `"1. AAA......80"`
    pub fn ranked_lines(&self) -> Vec<String> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, e))
            .collect()
    }
}
