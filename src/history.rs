//! Bounded log of recent rounds, persisted next to the economy snapshot.

use crate::errors::{JackpotResult, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

/// Summary of one resolved round
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRecord {
    pub round_id: Uuid,
    pub played_at: DateTime<Utc>,
    pub numbers: Vec<u8>,
    pub power_play: bool,
    pub winning_numbers: Vec<u8>,
    pub bonus: u8,
    pub matches: usize,
    pub bonus_match: bool,
    pub final_prize: i64,
    pub cost: i64,
}

/// Most recent rounds, oldest first; drops the oldest past `limit`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoundHistory {
    records: VecDeque<RoundRecord>,
    limit: usize,
}

impl RoundHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(limit),
            limit,
        }
    }

    pub fn push(&mut self, record: RoundRecord) {
        if self.limit == 0 {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Up to `n` records, newest first
    pub fn recent(&self, n: usize) -> Vec<&RoundRecord> {
        self.records.iter().rev().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn to_bytes(&self) -> JackpotResult<Vec<u8>> {
        serde_json::to_vec(&self.records).map_err(|e| {
            StorageError::WriteFailed(format!("Failed to encode round history: {}", e)).into()
        })
    }

    /// Decode stored records, keeping only the newest `limit`
    pub fn from_bytes(bytes: &[u8], limit: usize) -> JackpotResult<Self> {
        let records: Vec<RoundRecord> = serde_json::from_slice(bytes).map_err(|e| {
            StorageError::CorruptedData(format!("Failed to decode round history: {}", e))
        })?;

        let mut history = Self::new(limit);
        for record in records {
            history.push(record);
        }
        Ok(history)
    }
}
