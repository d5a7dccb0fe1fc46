//! Shared seams and configuration loading

pub mod config;
pub mod traits;

pub use config::ConfigLoader;
pub use traits::{DrawSource, StateStore};
