//! Session lifecycle: recovering from a bust and wiping everything.

use crate::engine::RoundEngine;
use crate::errors::{JackpotResult, RoundError};
use serde::Serialize;
use tracing::{info, warn};

/// Figures for the current session
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SessionSummary {
    pub games_played: u64,
    pub wins: u64,
    pub start_balance: i64,
    pub balance: i64,
    pub profit: i64,
    pub bust: bool,
}

impl RoundEngine {
    /// Start over with a fresh bankroll, keeping lifetime statistics and the jackpot
    pub fn start_new_session(&mut self) -> JackpotResult<SessionSummary> {
        let previous = self.session_summary();
        self.state.start_new_session(&self.config.economy);

        info!(
            player = %self.player_id,
            previous_games = previous.games_played,
            previous_profit = previous.profit,
            was_bust = previous.bust,
            "Started new session"
        );

        self.persist();
        Ok(previous)
    }

    /// Wipe the economy, history and stored data; `confirmed` must be true
    pub fn reset_all(&mut self, confirmed: bool) -> JackpotResult<()> {
        if !confirmed {
            return Err(RoundError::ResetNotConfirmed.into());
        }

        self.state.reset(&self.config.economy);
        self.history.clear();

        // State and history are removed together or not at all
        if let Err(e) = self.store.delete_batch(&[self.state_key(), self.history_key()]) {
            warn!(player = %self.player_id, error = %e, "Failed to clear stored data");
        }

        info!(player = %self.player_id, "Reset all statistics");
        Ok(())
    }

    pub fn session_summary(&self) -> SessionSummary {
        SessionSummary {
            games_played: self.state.session_games_played,
            wins: self.state.session_wins,
            start_balance: self.state.session_start_balance,
            balance: self.state.balance,
            profit: self.state.session_profit(),
            bust: self.state.is_bust(),
        }
    }
}
