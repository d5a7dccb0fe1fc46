//! Per-player engines for callers that serve several players at once
//!
//! Each player's engine sits behind its own mutex; the map itself is a
//! `DashMap` so different players never wait on each other.

use crate::{
    common::traits::{DrawSource, StateStore},
    config::JackpotConfig,
    engine::{validate_player_id, RoundEngine},
    errors::{JackpotResult, StorageError},
    lottery::DrawGenerator,
};
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Builds the draw source for a newly opened player
pub type DrawFactory = Box<dyn Fn(&str) -> Box<dyn DrawSource> + Send + Sync>;

pub struct EngineRegistry {
    config: JackpotConfig,
    store: Arc<dyn StateStore>,
    engines: DashMap<String, Arc<Mutex<RoundEngine>>>,
    draw_factory: DrawFactory,
}

impl EngineRegistry {
    /// Registry whose players draw from OS entropy
    pub fn new(config: JackpotConfig, store: Arc<dyn StateStore>) -> Self {
        let game = config.game.clone();
        Self::with_draw_factory(
            config,
            store,
            Box::new(move |_player: &str| -> Box<dyn DrawSource> {
                Box::new(DrawGenerator::from_entropy(&game))
            }),
        )
    }

    pub fn with_draw_factory(
        config: JackpotConfig,
        store: Arc<dyn StateStore>,
        draw_factory: DrawFactory,
    ) -> Self {
        Self {
            config,
            store,
            engines: DashMap::new(),
            draw_factory,
        }
    }

    /// Run `f` with exclusive access to the player's engine, opening it on first use
    pub fn with_player<T>(
        &self,
        player_id: &str,
        f: impl FnOnce(&mut RoundEngine) -> JackpotResult<T>,
    ) -> JackpotResult<T> {
        let engine = self.engine(player_id)?;
        let mut guard = engine.lock().map_err(|_| {
            StorageError::CorruptedData(format!("engine lock poisoned for player {}", player_id))
        })?;
        f(&mut *guard)
    }

    /// Ids of every player opened so far, sorted
    pub fn players(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.engines.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    fn engine(&self, player_id: &str) -> JackpotResult<Arc<Mutex<RoundEngine>>> {
        if let Some(engine) = self.engines.get(player_id) {
            return Ok(Arc::clone(engine.value()));
        }

        validate_player_id(player_id)?;

        // Entry API keeps two racing callers from opening the same player twice
        let entry = self.engines.entry(player_id.to_string());
        let engine = match entry {
            Entry::Occupied(occupied) => Arc::clone(occupied.get()),
            Entry::Vacant(vacant) => {
                let engine = RoundEngine::open(
                    self.config.clone(),
                    player_id,
                    self.store.clone(),
                    (self.draw_factory)(player_id),
                )?;
                debug!(player = player_id, "Opened player engine");
                Arc::clone(vacant.insert(Arc::new(Mutex::new(engine))).value())
            }
        };
        Ok(engine)
    }
}
