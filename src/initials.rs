//! Initials entry after a run
//!
//! Letters accumulate until three are in, at which point the score is
//! submitted exactly once and letter input shuts off in the same call.

use serde::{Deserialize, Serialize};

use crate::leaderboard::{Initials, Leaderboard, SubmitOutcome};
use crate::persistence::LeaderboardStore;

/// Choice offered once the leaderboard is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuChoice {
    NewGame,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Fewer than three letters in
    Typing,
    /// Score submitted, waiting for a menu choice
    PostSubmit,
}

/// Result of picking a letter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterOutcome {
    Accepted,
    /// Third letter: the board after submission
    Submitted(SubmitOutcome),
    Rejected,
}

#[derive(Debug, Clone)]
pub struct InitialsEntry {
    score: u64,
    typed: String,
    state: EntryState,
    leaderboard: Leaderboard,
    submitted: Option<SubmitOutcome>,
}

impl InitialsEntry {
    pub fn new(score: u64, leaderboard: Leaderboard) -> Self {
        Self {
            score,
            typed: String::with_capacity(Initials::LEN),
            state: EntryState::Typing,
            leaderboard,
            submitted: None,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    /// Typed letters padded with dots, e.g. `"AB."`
    pub fn display(&self) -> String {
        format!("{:.<width$}", self.typed, width = Initials::LEN)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn submitted(&self) -> Option<&SubmitOutcome> {
        self.submitted.as_ref()
    }

    pub fn select_letter(&mut self, letter: char, store: &mut dyn LeaderboardStore) -> LetterOutcome {
        if self.state != EntryState::Typing {
            return LetterOutcome::Rejected;
        }
        let letter = letter.to_ascii_uppercase();
        if !letter.is_ascii_uppercase() {
            log::warn!("Ignored initials input {letter:?}");
            return LetterOutcome::Rejected;
        }

        self.typed.push(letter);
        if self.typed.len() < Initials::LEN {
            return LetterOutcome::Accepted;
        }

        self.state = EntryState::PostSubmit;
        let initials = match Initials::try_from(self.typed.as_str()) {
            Ok(initials) => initials,
            Err(e) => {
                log::warn!("Initials rejected: {e}");
                self.typed.clear();
                self.state = EntryState::Typing;
                return LetterOutcome::Rejected;
            }
        };
        let outcome = self
            .leaderboard
            .submit_and_save(initials, self.score, store);
        if outcome.is_new_top {
            log::info!("New record: {} by {}", self.score, self.typed);
        }
        self.submitted = Some(outcome.clone());
        LetterOutcome::Submitted(outcome)
    }

    /// Accept a menu choice once the leaderboard is shown
    pub fn choose(&self, choice: MenuChoice) -> Option<MenuChoice> {
        (self.state == EntryState::PostSubmit).then_some(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn entry(score: u64) -> InitialsEntry {
        InitialsEntry::new(score, Leaderboard::new())
    }

    #[test]
    fn test_third_letter_submits() {
        let mut store = MemoryStore::default();
        let mut e = entry(250);
        assert_eq!(e.display(), "...");
        assert_eq!(e.select_letter('A', &mut store), LetterOutcome::Accepted);
        assert_eq!(e.select_letter('b', &mut store), LetterOutcome::Accepted);
        assert_eq!(e.display(), "AB.");
        assert_eq!(e.state(), EntryState::Typing);

        let LetterOutcome::Submitted(outcome) = e.select_letter('C', &mut store) else {
            panic!("third letter should submit");
        };
        assert!(outcome.is_new_top);
        assert_eq!(e.state(), EntryState::PostSubmit);
        assert_eq!(e.leaderboard().entries()[0].initials.as_str(), "ABC");
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_fourth_letter_impossible() {
        let mut store = MemoryStore::default();
        let mut e = entry(10);
        for c in ['X', 'Y', 'Z'] {
            e.select_letter(c, &mut store);
        }
        assert_eq!(e.select_letter('W', &mut store), LetterOutcome::Rejected);
        assert_eq!(e.typed(), "XYZ");
        // Submitted once only
        assert_eq!(e.leaderboard().entries().len(), 1);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_non_letters_rejected() {
        let mut store = MemoryStore::default();
        let mut e = entry(10);
        assert_eq!(e.select_letter('1', &mut store), LetterOutcome::Rejected);
        assert_eq!(e.select_letter(' ', &mut store), LetterOutcome::Rejected);
        assert_eq!(e.select_letter('é', &mut store), LetterOutcome::Rejected);
        assert!(e.typed().is_empty());
    }

    #[test]
    fn test_menu_only_after_submit() {
        let mut store = MemoryStore::default();
        let mut e = entry(10);
        assert_eq!(e.choose(MenuChoice::NewGame), None);
        for c in ['A', 'B', 'C'] {
            e.select_letter(c, &mut store);
        }
        assert_eq!(e.choose(MenuChoice::Exit), Some(MenuChoice::Exit));
        assert!(e.submitted().is_some());
    }
}
