//! Jackpot - Six-Ball Lottery Simulation Engine
//!
//! Round resolution and a persistent balance/jackpot economy for a
//! single-player number lottery. Players pick six numbers, the engine draws
//! six winners plus a bonus, scores the ticket against a fixed prize table,
//! and keeps balance, jackpot and statistics in RocksDB across sessions.

pub mod common;
pub mod config;
pub mod economy;
pub mod engine;
pub mod errors;
pub mod history;
pub mod lottery;
pub mod registry;
pub mod session;
pub mod storage;

pub use config::JackpotConfig;
pub use economy::EconomyState;
pub use engine::{RoundEngine, RoundResult, DEFAULT_PLAYER};
pub use errors::{JackpotError, JackpotResult, RoundError};
pub use lottery::{Draw, DrawGenerator, PrizeCalculator, PrizeTier, Ticket};
pub use registry::EngineRegistry;
pub use session::SessionSummary;
