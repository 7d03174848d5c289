//! Results handoff: what the run reports to the leaderboard

use super::state::Transition;
use crate::highscores::{Leaderboard, RankingError};

/// End-of-run summary handed to the results screen
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub score: u32,
    pub cleared: bool,
    /// Whether the score makes the leaderboard
    pub qualifies: bool,
    submitted: bool,
}

impl RunSummary {
    pub fn new(transition: Transition, board: &dyn Leaderboard) -> Self {
        Self {
            score: transition.score,
            cleared: transition.cleared,
            qualifies: board.is_qualifying(transition.score),
            submitted: false,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Record the run under `name`. Only the first successful submit counts;
    /// a non-qualifying run is never written. Returns the rank achieved.
    pub fn submit(
        &mut self,
        name: &str,
        timestamp: i64,
        board: &mut dyn Leaderboard,
    ) -> Result<Option<usize>, RankingError> {
        if self.submitted || !self.qualifies {
            return Ok(None);
        }
        let rank = board.upsert(name, self.score, timestamp)?;
        self.submitted = true;
        Ok(rank)
    }
}
