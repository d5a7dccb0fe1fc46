use crate::config::{PrizeTableConfig, NUMBERS_PER_DRAW};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display tier of a round's outcome
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PrizeTier {
    NoWin,
    Match2,
    Match3,
    Match4,
    Match5,
    Jackpot,
    /// All six plus the bonus; pays the same as `Jackpot`
    SuperJackpot,
}

impl PrizeTier {
    pub fn headline(&self) -> &'static str {
        match self {
            PrizeTier::NoWin => "No win this time",
            PrizeTier::Match2 => "Two numbers matched",
            PrizeTier::Match3 => "Three numbers matched",
            PrizeTier::Match4 => "Four numbers matched",
            PrizeTier::Match5 => "Five numbers matched",
            PrizeTier::Jackpot => "JACKPOT! All six numbers matched",
            PrizeTier::SuperJackpot => "SUPER JACKPOT! All six numbers and the bonus matched",
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// Pure payout rules over a fixed prize table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrizeCalculator {
    table: PrizeTableConfig,
}

impl Default for PrizeCalculator {
    fn default() -> Self {
        Self::new(PrizeTableConfig::default())
    }
}

impl PrizeCalculator {
    pub fn new(table: PrizeTableConfig) -> Self {
        Self { table }
    }

    /// Prize before the power-play multiplier
    pub fn base_prize(&self, matches: usize, jackpot: i64) -> i64 {
        match matches {
            2 => self.table.match_2,
            3 => self.table.match_3,
            4 => self.table.match_4,
            5 => self.table.match_5,
            NUMBERS_PER_DRAW => jackpot.max(0),
            _ => 0,
        }
    }

    /// Final payout; power play doubles every tier, jackpots included.
    ///
    /// The bonus match only changes the tier (see [`PrizeCalculator::tier`]),
    /// never the amount.
    pub fn calculate(
        &self,
        matches: usize,
        _bonus_match: bool,
        jackpot: i64,
        power_play: bool,
    ) -> i64 {
        let base = self.base_prize(matches, jackpot);
        if power_play {
            base.saturating_mul(2)
        } else {
            base
        }
    }

    pub fn tier(&self, matches: usize, bonus_match: bool) -> PrizeTier {
        match matches {
            2 => PrizeTier::Match2,
            3 => PrizeTier::Match3,
            4 => PrizeTier::Match4,
            5 => PrizeTier::Match5,
            NUMBERS_PER_DRAW if bonus_match => PrizeTier::SuperJackpot,
            NUMBERS_PER_DRAW => PrizeTier::Jackpot,
            _ => PrizeTier::NoWin,
        }
    }
}
