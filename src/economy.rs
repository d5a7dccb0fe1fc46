//! Balance, jackpot and statistics ledger
//!
//! The ledger is persisted as a versioned JSON snapshot. Decoding maps known
//! fields explicitly and defaults anything missing, so snapshots written
//! before session tracking existed still load.

use crate::config::EconomyConfig;
use crate::errors::{JackpotResult, StorageError};
use serde::{Deserialize, Serialize};

/// Snapshot layout written by this version
pub const SNAPSHOT_VERSION: u32 = 2;

/// Mutable economy of one player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EconomyState {
    pub balance: i64,
    pub jackpot: i64,
    pub games_played: u64,
    pub total_wins: u64,
    pub biggest_win: i64,
    pub win_streak: u64,
    pub last_win: i64,
    pub session_games_played: u64,
    pub session_wins: u64,
    pub session_start_balance: i64,
}

impl EconomyState {
    /// Starting configuration
    pub fn new(config: &EconomyConfig) -> Self {
        Self {
            balance: config.starting_balance,
            jackpot: config.starting_jackpot,
            games_played: 0,
            total_wins: 0,
            biggest_win: 0,
            win_streak: 0,
            last_win: 0,
            session_games_played: 0,
            session_wins: 0,
            session_start_balance: config.starting_balance,
        }
    }

    /// Full wipe back to the starting configuration
    pub fn reset(&mut self, config: &EconomyConfig) {
        *self = Self::new(config);
    }

    /// Restore balance and session fields; lifetime totals and jackpot stay
    pub fn start_new_session(&mut self, config: &EconomyConfig) {
        self.balance = config.starting_balance;
        self.session_games_played = 0;
        self.session_wins = 0;
        self.session_start_balance = config.starting_balance;
        self.win_streak = 0;
        self.last_win = 0;
    }

    /// Take a ticket's cost and count the game
    pub(crate) fn debit_ticket(&mut self, cost: i64) {
        self.balance -= cost;
        self.games_played += 1;
        self.session_games_played += 1;
    }

    /// Apply the round's payout, or a loss when it is zero
    pub(crate) fn settle(&mut self, prize: i64) {
        if prize > 0 {
            self.balance += prize;
            self.total_wins += 1;
            self.session_wins += 1;
            self.win_streak += 1;
            self.last_win = prize;
            self.biggest_win = self.biggest_win.max(prize);
        } else {
            self.win_streak = 0;
            self.last_win = 0;
        }
    }

    /// Reset the jackpot after it was hit, otherwise grow it from the ticket cost
    pub(crate) fn update_jackpot(&mut self, jackpot_hit: bool, cost: i64, config: &EconomyConfig) {
        if jackpot_hit {
            self.jackpot = config.starting_jackpot;
        } else {
            self.jackpot += config.jackpot_growth(cost);
        }
    }

    pub fn is_bust(&self) -> bool {
        self.balance <= 0
    }

    /// Balance as shown to the player; never negative
    pub fn display_balance(&self) -> i64 {
        self.balance.max(0)
    }

    pub fn session_profit(&self) -> i64 {
        self.balance - self.session_start_balance
    }

    /// Lifetime share of winning rounds in `[0, 1]`
    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_wins as f64 / self.games_played as f64
    }

    /// Encode as the current snapshot version
    pub fn to_snapshot_bytes(&self) -> JackpotResult<Vec<u8>> {
        let snapshot = EconomySnapshot {
            version: Some(SNAPSHOT_VERSION),
            balance: Some(self.balance),
            jackpot: Some(self.jackpot),
            games_played: Some(self.games_played),
            total_wins: Some(self.total_wins),
            biggest_win: Some(self.biggest_win),
            win_streak: Some(self.win_streak),
            last_win: Some(self.last_win),
            session_games_played: Some(self.session_games_played),
            session_wins: Some(self.session_wins),
            session_start_balance: Some(self.session_start_balance),
        };

        serde_json::to_vec(&snapshot).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to encode economy snapshot: {}", e)).into()
        })
    }

    /// Decode any supported snapshot version, defaulting missing fields
    pub fn from_snapshot_bytes(bytes: &[u8], config: &EconomyConfig) -> JackpotResult<Self> {
        let snapshot: EconomySnapshot = serde_json::from_slice(bytes).map_err(|e| {
            StorageError::CorruptedData(format!("Failed to decode economy snapshot: {}", e))
        })?;
        snapshot.into_state(config)
    }
}

/// Wire form of [`EconomyState`]; every field optional so older layouts decode
#[derive(Debug, Default, Serialize, Deserialize)]
struct EconomySnapshot {
    // Version 1 snapshots carry no version field
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    balance: Option<i64>,
    #[serde(default)]
    jackpot: Option<i64>,
    #[serde(default)]
    games_played: Option<u64>,
    #[serde(default)]
    total_wins: Option<u64>,
    #[serde(default)]
    biggest_win: Option<i64>,
    #[serde(default)]
    win_streak: Option<u64>,
    #[serde(default)]
    last_win: Option<i64>,
    #[serde(default)]
    session_games_played: Option<u64>,
    #[serde(default)]
    session_wins: Option<u64>,
    #[serde(default)]
    session_start_balance: Option<i64>,
}

impl EconomySnapshot {
    fn into_state(self, config: &EconomyConfig) -> JackpotResult<EconomyState> {
        let version = self.version.unwrap_or(1);
        if version > SNAPSHOT_VERSION {
            return Err(StorageError::CorruptedData(format!(
                "Economy snapshot version {} is newer than supported version {}",
                version, SNAPSHOT_VERSION
            ))
            .into());
        }

        let balance = self.balance.unwrap_or(config.starting_balance);
        Ok(EconomyState {
            balance,
            jackpot: self.jackpot.unwrap_or(config.starting_jackpot),
            games_played: self.games_played.unwrap_or(0),
            total_wins: self.total_wins.unwrap_or(0),
            biggest_win: self.biggest_win.unwrap_or(0),
            win_streak: self.win_streak.unwrap_or(0),
            last_win: self.last_win.unwrap_or(0),
            session_games_played: self.session_games_played.unwrap_or(0),
            session_wins: self.session_wins.unwrap_or(0),
            session_start_balance: self.session_start_balance.unwrap_or(balance),
        })
    }
}
