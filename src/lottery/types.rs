use crate::config::{MIN_NUMBER, NUMBERS_PER_DRAW};
use crate::errors::RoundError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The player's numbers and power-play choice for one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ticket {
    numbers: Vec<u8>,
    pub power_play: bool,
}

impl Ticket {
    /// Build a ticket, checking shape, range and uniqueness
    pub fn new(numbers: Vec<u8>, power_play: bool, max_number: u8) -> Result<Self, RoundError> {
        let ticket = Self {
            numbers,
            power_play,
        };
        ticket.validate(max_number)?;
        Ok(ticket.sorted())
    }

    /// Build a ticket without validation; `RoundEngine::play` still checks it
    pub fn unchecked(numbers: Vec<u8>, power_play: bool) -> Self {
        Self {
            numbers,
            power_play,
        }
    }

    pub fn numbers(&self) -> &[u8] {
        &self.numbers
    }

    /// Check the ticket against the number range `[1, max_number]`
    pub fn validate(&self, max_number: u8) -> Result<(), RoundError> {
        if self.numbers.len() != NUMBERS_PER_DRAW {
            return Err(RoundError::InvalidTicket(format!(
                "expected {} numbers, got {}",
                NUMBERS_PER_DRAW,
                self.numbers.len()
            )));
        }

        if let Some(n) = self
            .numbers
            .iter()
            .find(|&&n| n < MIN_NUMBER || n > max_number)
        {
            return Err(RoundError::InvalidTicket(format!(
                "number {} is outside {}..={}",
                n, MIN_NUMBER, max_number
            )));
        }

        let unique: BTreeSet<u8> = self.numbers.iter().copied().collect();
        if unique.len() != self.numbers.len() {
            return Err(RoundError::InvalidTicket("numbers must be distinct".to_string()));
        }

        Ok(())
    }

    fn sorted(mut self) -> Self {
        self.numbers.sort_unstable();
        self
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_numbers(&self.numbers))?;
        if self.power_play {
            write!(f, " (power play)")?;
        }
        Ok(())
    }
}

/// Winning numbers and bonus number for one round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Draw {
    /// Six distinct numbers, ascending
    pub winning_numbers: Vec<u8>,
    /// Never one of `winning_numbers`
    pub bonus: u8,
}

impl Draw {
    /// How many ticket numbers appear among the winning numbers
    pub fn count_matches(&self, ticket: &Ticket) -> usize {
        let winners: BTreeSet<u8> = self.winning_numbers.iter().copied().collect();
        let picked: BTreeSet<u8> = ticket.numbers().iter().copied().collect();
        winners.intersection(&picked).count()
    }

    /// Whether the ticket holds the bonus number
    pub fn bonus_matched(&self, ticket: &Ticket) -> bool {
        ticket.numbers().contains(&self.bonus)
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + bonus {}", join_numbers(&self.winning_numbers), self.bonus)
    }
}

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
