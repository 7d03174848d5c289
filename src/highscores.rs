//! High score leaderboard
//!
//! Top 10 scores, one entry per run (keyed by the run's timestamp). Storage
//! is up to the caller; the board round-trips through JSON and sanitizes
//! whatever it is handed back.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clamp_score;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;
/// Longest allowed player name
pub const MAX_NAME_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankingError {
    #[error("name must be 1-{MAX_NAME_LEN} printable ASCII characters, got {0:?}")]
    InvalidName(String),
}

/// What the run needs from a leaderboard at the end of a run
pub trait Leaderboard {
    /// Would this score make the board?
    fn is_qualifying(&self, score: u32) -> bool;

    /// Insert or replace the entry for `timestamp`. Returns the 1-indexed
    /// position it landed at, or `None` if it fell off the board.
    fn upsert(&mut self, name: &str, score: u32, timestamp: i64)
    -> Result<Option<usize>, RankingError>;
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u32,
    /// Unix timestamp (ms) of the run; unique per run
    pub timestamp: i64,
}

/// High score leaderboard, sorted by score then newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

/// Trim and validate a player name
pub fn normalize_name(name: &str) -> Result<String, RankingError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    let printable = trimmed.chars().all(|c| (' '..='~').contains(&c));
    if (1..=MAX_NAME_LEN).contains(&len) && printable {
        Ok(trimmed.to_string())
    } else {
        Err(RankingError::InvalidName(name.to_string()))
    }
}

impl HighScores {
    /// Create empty leaderboard
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a score qualifies for the leaderboard. Ties with the last
    /// place don't get in once the board is full.
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries
            .get(MAX_HIGH_SCORES - 1)
            .map(|e| score > e.score)
            .unwrap_or(true)
    }

    /// Entries with competition ranks: equal scores share a rank and the
    /// next rank skips (1, 1, 1, 4, ...)
    pub fn ranked(&self) -> Vec<(usize, &HighScoreEntry)> {
        let mut rank = 0;
        let mut prev: Option<u32> = None;
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                if prev != Some(entry.score) {
                    rank = idx + 1;
                    prev = Some(entry.score);
                }
                (rank, entry)
            })
            .collect()
    }

    /// Check if the leaderboard is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    fn sort_and_trim(&mut self) {
        self.entries.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
        });
        self.entries.truncate(MAX_HIGH_SCORES);
    }

    /// Load from JSON, dropping malformed entries. Unreadable input yields
    /// an empty board.
    pub fn from_json(json: &str) -> Self {
        let raw: Vec<serde_json::Value> = match serde_json::from_str(json) {
            Ok(serde_json::Value::Array(items)) => items,
            Ok(_) | Err(_) => {
                log::warn!("High score data unreadable, starting fresh");
                return Self::new();
            }
        };

        let mut scores = Self {
            entries: raw.iter().filter_map(sanitize_entry).collect(),
        };
        scores.sort_and_trim();
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }
}

fn sanitize_entry(value: &serde_json::Value) -> Option<HighScoreEntry> {
    let name = normalize_name(value.get("name")?.as_str()?).ok()?;
    let score = value.get("score")?.as_f64().filter(|s| s.is_finite())?;
    let timestamp = value.get("timestamp")?.as_f64().filter(|t| t.is_finite())?;
    Some(HighScoreEntry {
        name,
        score: clamp_score(score.trunc() as i64),
        timestamp: timestamp.trunc() as i64,
    })
}

impl Leaderboard for HighScores {
    fn is_qualifying(&self, score: u32) -> bool {
        self.qualifies(score)
    }

    fn upsert(
        &mut self,
        name: &str,
        score: u32,
        timestamp: i64,
    ) -> Result<Option<usize>, RankingError> {
        let name = normalize_name(name)?;
        let entry = HighScoreEntry {
            name,
            score: score.min(crate::consts::SCORE_MAX),
            timestamp,
        };
        match self.entries.iter_mut().find(|e| e.timestamp == timestamp) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self.sort_and_trim();
        let rank = self
            .entries
            .iter()
            .position(|e| e.timestamp == timestamp)
            .map(|i| i + 1);
        log::info!("High score {} for run {}: rank {:?}", score, timestamp, rank);
        Ok(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_board() -> HighScores {
        let mut board = HighScores::new();
        for i in 0..MAX_HIGH_SCORES {
            board
                .upsert("AAA", (i as u32 + 1) * 100, i as i64)
                .unwrap();
        }
        board
    }

    #[test]
    fn test_empty_board_accepts_anything() {
        let board = HighScores::new();
        assert!(board.qualifies(0));
        assert!(board.is_empty());
        assert_eq!(board.top_score(), None);
    }

    #[test]
    fn test_full_board_needs_strictly_more_than_last() {
        let board = full_board();
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(board.top_score(), Some(1000));
        assert!(!board.qualifies(100));
        assert!(board.qualifies(101));
    }

    #[test]
    fn test_upsert_sorts_and_trims() {
        let mut board = full_board();
        let rank = board.upsert("NEW", 550, 99).unwrap();
        assert_eq!(rank, Some(6));
        assert_eq!(board.entries.len(), MAX_HIGH_SCORES);
        assert!(board.entries.iter().all(|e| e.score != 100));

        // Too low to stay on the board
        assert_eq!(board.upsert("LOW", 1, 100).unwrap(), None);
    }

    #[test]
    fn test_upsert_replaces_same_run() {
        let mut board = HighScores::new();
        board.upsert("AAA", 100, 42).unwrap();
        board.upsert("BBB", 300, 42).unwrap();
        assert_eq!(board.entries.len(), 1);
        assert_eq!(board.entries[0].name, "BBB");
        assert_eq!(board.entries[0].score, 300);
    }

    #[test]
    fn test_ties_newest_first_and_shared_rank() {
        let mut board = HighScores::new();
        board.upsert("OLD", 500, 1).unwrap();
        board.upsert("NEW", 500, 2).unwrap();
        board.upsert("TOP", 900, 3).unwrap();
        board.upsert("LOW", 100, 4).unwrap();
        assert_eq!(board.entries[1].name, "NEW");
        let ranks: Vec<usize> = board.ranked().iter().map(|(r, _)| *r).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn test_name_validation() {
        assert_eq!(normalize_name("  Ace  ").unwrap(), "Ace");
        assert!(normalize_name("").is_err());
        assert!(normalize_name("   ").is_err());
        assert!(normalize_name("ABCDEFGHIJK").is_err());
        assert!(normalize_name("名前").is_err());
        assert!(normalize_name("b\tad").is_err());

        let mut board = HighScores::new();
        assert_eq!(
            board.upsert("b\tad", 10, 1),
            Err(RankingError::InvalidName("b\tad".into()))
        );
        assert!(board.is_empty());

        // Surrounding whitespace is trimmed, not rejected
        assert_eq!(board.upsert("\tACE ", 10, 2), Ok(Some(1)));
        assert_eq!(board.entries[0].name, "ACE");
    }

    #[test]
    fn test_json_round_trip_and_sanitize() {
        let mut board = HighScores::new();
        board.upsert("AAA", 300, 1).unwrap();
        board.upsert("BBB", 200, 2).unwrap();
        let json = board.to_json().unwrap();
        assert_eq!(HighScores::from_json(&json).entries, board.entries);

        let dirty = r#"[
            {"name": " CCC ", "score": 123456789012, "timestamp": 5.7},
            {"name": "", "score": 10, "timestamp": 1},
            {"name": "DDD", "score": "lots", "timestamp": 2},
            {"name": "EEE", "score": -20, "timestamp": 3}
        ]"#;
        let loaded = HighScores::from_json(dirty);
        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.entries[0].name, "CCC");
        assert_eq!(loaded.entries[0].score, crate::consts::SCORE_MAX);
        assert_eq!(loaded.entries[0].timestamp, 5);
        assert_eq!(loaded.entries[1].score, 0);
    }

    #[test]
    fn test_corrupt_json_starts_fresh() {
        assert!(HighScores::from_json("{not json").is_empty());
        assert!(HighScores::from_json("{\"a\": 1}").is_empty());
    }
}
