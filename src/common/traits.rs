//! Shared traits and interfaces
//!
//! The engine talks to its random source and its durable store only through
//! these traits, so tests can script draws and storage failures.

use crate::errors::JackpotResult;
use crate::lottery::Draw;

/// Source of winning numbers for a round
pub trait DrawSource: Send {
    /// Draw six winning numbers and a bonus number distinct from them
    fn draw(&mut self) -> JackpotResult<Draw>;

    /// Pick six distinct numbers for a ticket
    fn quick_pick(&mut self) -> JackpotResult<Vec<u8>>;
}

/// Durable key-value storage for economy snapshots and history
pub trait StateStore: Send + Sync {
    /// Read the value stored under `key`
    fn load(&self, key: &str) -> JackpotResult<Option<Vec<u8>>>;

    /// Write a single value
    fn save(&self, key: &str, value: &[u8]) -> JackpotResult<()>;

    /// Write several values atomically
    fn save_batch(&self, items: &[(String, Vec<u8>)]) -> JackpotResult<()>;

    /// Remove the value under `key`; missing keys are not an error
    fn delete(&self, key: &str) -> JackpotResult<()>;

    /// Remove several keys atomically; missing keys are not an error
    fn delete_batch(&self, keys: &[String]) -> JackpotResult<()>;
}
