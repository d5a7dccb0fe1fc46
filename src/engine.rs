//! Round resolution for one player's economy
//!
//! A round is all-or-nothing: validation, affordability and the draw happen
//! before anything is touched, and the economy updates are applied to a
//! working copy that replaces the live state in one assignment. Persistence
//! runs afterwards and is best-effort.

use crate::{
    common::traits::{DrawSource, StateStore},
    config::{JackpotConfig, NUMBERS_PER_DRAW},
    economy::EconomyState,
    errors::{JackpotResult, RoundError},
    history::{RoundHistory, RoundRecord},
    lottery::{Draw, DrawGenerator, PrizeCalculator, PrizeTier, Ticket},
    storage::open_store,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Player used when none is given
pub const DEFAULT_PLAYER: &str = "local";

/// Everything the caller needs to render a resolved round
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoundResult {
    pub round_id: Uuid,
    pub played_at: DateTime<Utc>,
    pub ticket: Ticket,
    pub draw: Draw,
    pub matches: usize,
    pub bonus_match: bool,
    pub tier: PrizeTier,
    pub prize_before_multiplier: i64,
    pub final_prize: i64,
    pub cost: i64,
    pub jackpot_before: i64,
    pub jackpot_after: i64,
    pub balance_after: i64,
    pub bust: bool,
    /// False when the post-round save failed; the round still counts
    pub persisted: bool,
}

impl RoundResult {
    pub fn is_win(&self) -> bool {
        self.final_prize > 0
    }
}

/// Plays rounds against one player's economy
pub struct RoundEngine {
    pub(crate) config: JackpotConfig,
    pub(crate) player_id: String,
    pub(crate) state: EconomyState,
    pub(crate) history: RoundHistory,
    prizes: PrizeCalculator,
    draws: Box<dyn DrawSource>,
    pub(crate) store: Arc<dyn StateStore>,
}

impl RoundEngine {
    /// Open a player's engine, loading any persisted state from `store`
    pub fn open(
        config: JackpotConfig,
        player_id: &str,
        store: Arc<dyn StateStore>,
        draws: Box<dyn DrawSource>,
    ) -> JackpotResult<Self> {
        validate_player_id(player_id)?;

        let state_key = state_key(&config.storage.key_prefix, player_id);
        let state = match store.load(&state_key)? {
            Some(bytes) => EconomyState::from_snapshot_bytes(&bytes, &config.economy)?,
            None => EconomyState::new(&config.economy),
        };

        let history = load_history(store.as_ref(), &config, player_id);

        debug!(
            player = player_id,
            balance = state.balance,
            jackpot = state.jackpot,
            rounds = history.len(),
            "Opened economy"
        );

        Ok(Self {
            prizes: PrizeCalculator::new(config.economy.prize_table),
            config,
            player_id: player_id.to_string(),
            state,
            history,
            draws,
            store,
        })
    }

    /// Open with the store selected by the configuration and OS entropy
    pub fn from_config(config: JackpotConfig, player_id: &str) -> JackpotResult<Self> {
        let store = open_store(&config.storage)?;
        let draws = Box::new(DrawGenerator::from_entropy(&config.game));
        Self::open(config, player_id, store, draws)
    }

    /// Resolve one round for `ticket`
    pub fn play(&mut self, ticket: &Ticket) -> JackpotResult<RoundResult> {
        ticket.validate(self.config.game.max_number)?;

        if self.state.is_bust() {
            return Err(RoundError::SessionBusted.into());
        }

        let cost = self.ticket_cost(ticket.power_play);
        if self.state.balance < cost {
            return Err(RoundError::InsufficientFunds {
                balance: self.state.balance,
                cost,
            }
            .into());
        }

        let draw = self.draws.draw()?;
        let matches = draw.count_matches(ticket);
        let bonus_match = draw.bonus_matched(ticket);

        let jackpot_before = self.state.jackpot;
        let prize_before_multiplier = self.prizes.base_prize(matches, jackpot_before);
        let final_prize = self
            .prizes
            .calculate(matches, bonus_match, jackpot_before, ticket.power_play);

        let economy = &self.config.economy;
        let mut next = self.state.clone();
        next.debit_ticket(cost);
        next.settle(final_prize);
        next.update_jackpot(matches == NUMBERS_PER_DRAW, cost, economy);
        let bust = next.is_bust();

        self.state = next;

        let round_id = Uuid::new_v4();
        let played_at = Utc::now();
        self.history.push(RoundRecord {
            round_id,
            played_at,
            numbers: ticket.numbers().to_vec(),
            power_play: ticket.power_play,
            winning_numbers: draw.winning_numbers.clone(),
            bonus: draw.bonus,
            matches,
            bonus_match,
            final_prize,
            cost,
        });

        let persisted = self.persist();

        debug!(
            player = %self.player_id,
            %round_id,
            matches,
            bonus_match,
            final_prize,
            balance = self.state.balance,
            jackpot = self.state.jackpot,
            bust,
            "Round resolved"
        );

        Ok(RoundResult {
            round_id,
            played_at,
            ticket: ticket.clone(),
            draw,
            matches,
            bonus_match,
            tier: self.prizes.tier(matches, bonus_match),
            prize_before_multiplier,
            final_prize,
            cost,
            jackpot_before,
            jackpot_after: self.state.jackpot,
            balance_after: self.state.balance,
            bust,
            persisted,
        })
    }

    /// Six distinct numbers for a ticket; touches no state
    pub fn quick_pick(&mut self) -> JackpotResult<Vec<u8>> {
        self.draws.quick_pick()
    }

    pub fn ticket_cost(&self, power_play: bool) -> i64 {
        self.config.economy.ticket_cost(power_play)
    }

    pub fn can_afford(&self, power_play: bool) -> bool {
        !self.state.is_bust() && self.state.balance >= self.ticket_cost(power_play)
    }

    pub fn is_bust(&self) -> bool {
        self.state.is_bust()
    }

    /// Read-only view of the economy
    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Owned copy of the economy
    pub fn snapshot(&self) -> EconomyState {
        self.state.clone()
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn config(&self) -> &JackpotConfig {
        &self.config
    }

    pub(crate) fn state_key(&self) -> String {
        state_key(&self.config.storage.key_prefix, &self.player_id)
    }

    pub(crate) fn history_key(&self) -> String {
        history_key(&self.config.storage.key_prefix, &self.player_id)
    }

    /// Write snapshot and history in one batch; failures are logged, not raised
    pub(crate) fn persist(&self) -> bool {
        match self.try_persist() {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    player = %self.player_id,
                    error = %e,
                    "Failed to persist economy; continuing in memory"
                );
                false
            }
        }
    }

    fn try_persist(&self) -> JackpotResult<()> {
        let items = vec![
            (self.state_key(), self.state.to_snapshot_bytes()?),
            (self.history_key(), self.history.to_bytes()?),
        ];
        self.store.save_batch(&items)
    }
}

fn load_history(store: &dyn StateStore, config: &JackpotConfig, player_id: &str) -> RoundHistory {
    let limit = config.game.history_limit;
    let key = history_key(&config.storage.key_prefix, player_id);

    let loaded = store
        .load(&key)
        .and_then(|bytes| bytes.map(|b| RoundHistory::from_bytes(&b, limit)).transpose());

    match loaded {
        Ok(Some(history)) => history,
        Ok(None) => RoundHistory::new(limit),
        Err(e) => {
            warn!(player = player_id, error = %e, "Discarding unreadable round history");
            RoundHistory::new(limit)
        }
    }
}

pub fn state_key(prefix: &str, player_id: &str) -> String {
    format!("{}:{}:state", prefix, player_id)
}

pub fn history_key(prefix: &str, player_id: &str) -> String {
    format!("{}:{}:history", prefix, player_id)
}

/// Player ids become part of storage keys: ASCII alphanumerics, `-` and `_`
pub fn validate_player_id(player_id: &str) -> Result<(), RoundError> {
    let valid = !player_id.is_empty()
        && player_id.len() <= 64
        && player_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(RoundError::InvalidPlayerId(player_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::JackpotError;
    use crate::lottery::ScriptedDraws;
    use crate::storage::MemoryStateStore;

    fn draw(winning: [u8; 6], bonus: u8) -> Draw {
        Draw {
            winning_numbers: winning.to_vec(),
            bonus,
        }
    }

    fn losing_draw() -> Draw {
        draw([30, 31, 32, 33, 34, 35], 29)
    }

    fn ticket(power_play: bool) -> Ticket {
        Ticket::new(vec![1, 2, 3, 4, 5, 6], power_play, 35).unwrap()
    }

    fn engine_with(draws: Vec<Draw>) -> (RoundEngine, Arc<MemoryStateStore>) {
        let store = Arc::new(MemoryStateStore::new());
        let engine = RoundEngine::open(
            JackpotConfig::testing(),
            DEFAULT_PLAYER,
            store.clone(),
            Box::new(ScriptedDraws::new(draws)),
        )
        .unwrap();
        (engine, store)
    }

    fn round_error(err: JackpotError) -> RoundError {
        err.as_round_error().cloned().expect("Expected round error")
    }

    #[test]
    fn test_losing_round() {
        let (mut engine, _) = engine_with(vec![losing_draw()]);

        let result = engine.play(&ticket(false)).unwrap();

        assert_eq!(result.matches, 0);
        assert_eq!(result.final_prize, 0);
        assert_eq!(result.tier, PrizeTier::NoWin);
        assert_eq!(result.balance_after, 95);
        assert_eq!(result.jackpot_after, 10_001);
        assert!(!result.bust);
        assert!(result.persisted);

        let state = engine.state();
        assert_eq!(state.balance, 95);
        assert_eq!(state.win_streak, 0);
        assert_eq!(state.jackpot, 10_001);
        assert_eq!(state.games_played, 1);
        assert_eq!(state.session_games_played, 1);
    }

    #[test]
    fn test_jackpot_round_resets_jackpot() {
        let (mut engine, _) = engine_with(vec![draw([1, 2, 3, 4, 5, 6], 7)]);

        let result = engine.play(&ticket(false)).unwrap();

        assert_eq!(result.matches, 6);
        assert!(!result.bonus_match);
        assert_eq!(result.tier, PrizeTier::Jackpot);
        assert_eq!(result.final_prize, 10_000);
        assert_eq!(result.balance_after, 100 - 5 + 10_000);
        assert_eq!(result.jackpot_after, 10_000);

        let state = engine.state();
        assert_eq!(state.total_wins, 1);
        assert_eq!(state.win_streak, 1);
        assert_eq!(state.biggest_win, 10_000);
        assert_eq!(state.last_win, 10_000);
    }

    #[test]
    fn test_power_play_jackpot_uses_pre_growth_value() {
        let (mut engine, _) = engine_with(vec![losing_draw(), draw([1, 2, 3, 4, 5, 6], 7)]);

        // First round grows the jackpot by floor(10 * 0.3) = 3
        engine.play(&ticket(true)).unwrap();
        assert_eq!(engine.state().jackpot, 10_003);

        let result = engine.play(&ticket(true)).unwrap();
        assert_eq!(result.jackpot_before, 10_003);
        assert_eq!(result.prize_before_multiplier, 10_003);
        assert_eq!(result.final_prize, 20_006);
        assert_eq!(result.jackpot_after, 10_000);
        assert_eq!(result.balance_after, 100 - 10 - 10 + 20_006);
    }

    #[test]
    fn test_partial_match_with_bonus() {
        let (mut engine, _) = engine_with(vec![draw([1, 2, 3, 20, 21, 22], 4)]);

        let result = engine.play(&ticket(false)).unwrap();

        assert_eq!(result.matches, 3);
        assert!(result.bonus_match);
        assert_eq!(result.tier, PrizeTier::Match3);
        assert_eq!(result.final_prize, 25);
        assert_eq!(result.balance_after, 120);
        assert_eq!(result.jackpot_after, 10_001);
    }

    #[test]
    fn test_win_streak_resets_on_loss() {
        let (mut engine, _) = engine_with(vec![
            draw([1, 2, 20, 21, 22, 23], 30),
            draw([1, 2, 20, 21, 22, 23], 30),
            losing_draw(),
        ]);

        engine.play(&ticket(false)).unwrap();
        engine.play(&ticket(false)).unwrap();
        assert_eq!(engine.state().win_streak, 2);

        engine.play(&ticket(false)).unwrap();
        assert_eq!(engine.state().win_streak, 0);
        assert_eq!(engine.state().last_win, 0);
        assert_eq!(engine.state().total_wins, 2);
    }

    #[test]
    fn test_twenty_losses_bust() {
        let (mut engine, _) = engine_with(vec![losing_draw(); 21]);

        for round in 1..=20 {
            let result = engine.play(&ticket(false)).unwrap();
            assert_eq!(result.bust, round == 20, "round {}", round);
        }
        assert_eq!(engine.state().balance, 0);
        assert!(engine.is_bust());
        assert!(!engine.can_afford(false));

        let err = round_error(engine.play(&ticket(false)).unwrap_err());
        assert_eq!(err, RoundError::SessionBusted);
        assert_eq!(engine.state().games_played, 20);
    }

    #[test]
    fn test_bust_boundary_at_one() {
        let (mut engine, _) = engine_with(vec![losing_draw()]);
        engine.state.balance = 6;

        let result = engine.play(&ticket(false)).unwrap();
        assert_eq!(result.balance_after, 1);
        assert!(!result.bust);
    }

    #[test]
    fn test_rejections_leave_state_untouched() {
        let (mut engine, _) = engine_with(vec![]);
        let before = engine.snapshot();

        let invalid = Ticket::unchecked(vec![1, 1, 2, 3, 4, 5], false);
        assert!(matches!(
            round_error(engine.play(&invalid).unwrap_err()),
            RoundError::InvalidTicket(_)
        ));

        let out_of_range = Ticket::unchecked(vec![1, 2, 3, 4, 5, 36], false);
        assert!(matches!(
            round_error(engine.play(&out_of_range).unwrap_err()),
            RoundError::InvalidTicket(_)
        ));

        // No draws scripted: the draw step fails after validation passes
        assert!(matches!(
            round_error(engine.play(&ticket(false)).unwrap_err()),
            RoundError::GenerationExhausted { .. }
        ));

        assert_eq!(engine.snapshot(), before);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_insufficient_funds() {
        let (mut engine, _) = engine_with(vec![losing_draw()]);
        engine.state.balance = 7;

        let err = round_error(engine.play(&ticket(true)).unwrap_err());
        assert_eq!(err, RoundError::InsufficientFunds { balance: 7, cost: 10 });
        assert_eq!(engine.state().balance, 7);
        assert_eq!(engine.state().games_played, 0);
    }

    #[test]
    fn test_state_reads_are_idempotent() {
        let (mut engine, _) = engine_with(vec![losing_draw()]);
        engine.play(&ticket(false)).unwrap();

        assert_eq!(engine.snapshot(), engine.snapshot());
        assert_eq!(engine.state(), engine.state());
    }

    #[test]
    fn test_round_is_persisted_and_reloaded() {
        let (mut engine, store) = engine_with(vec![draw([1, 2, 10, 11, 12, 13], 30)]);
        engine.play(&ticket(false)).unwrap();
        let expected = engine.snapshot();

        let reopened = RoundEngine::open(
            JackpotConfig::testing(),
            DEFAULT_PLAYER,
            store,
            Box::new(ScriptedDraws::default()),
        )
        .unwrap();

        assert_eq!(reopened.snapshot(), expected);
        assert_eq!(reopened.history().len(), 1);
        assert_eq!(reopened.history().recent(1)[0].final_prize, 5);
    }

    #[test]
    fn test_persistence_failure_is_not_fatal() {
        let (mut engine, store) = engine_with(vec![losing_draw()]);
        store.set_fail_writes(true);

        let result = engine.play(&ticket(false)).unwrap();

        assert!(!result.persisted);
        assert_eq!(engine.state().balance, 95);
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_history_is_discarded() {
        let store = Arc::new(MemoryStateStore::new());
        let config = JackpotConfig::testing();
        store
            .save(&history_key(&config.storage.key_prefix, DEFAULT_PLAYER), b"garbage")
            .unwrap();

        let engine =
            RoundEngine::open(config, DEFAULT_PLAYER, store, Box::new(ScriptedDraws::default()))
                .unwrap();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_quick_pick_has_no_side_effects() {
        let store = Arc::new(MemoryStateStore::new());
        let config = JackpotConfig::testing();
        let mut engine = RoundEngine::open(
            config.clone(),
            DEFAULT_PLAYER,
            store.clone(),
            Box::new(DrawGenerator::seeded(5, &config.game)),
        )
        .unwrap();
        let before = engine.snapshot();

        let numbers = engine.quick_pick().unwrap();

        assert!(Ticket::new(numbers, false, 35).is_ok());
        assert_eq!(engine.snapshot(), before);
        assert!(store.is_empty());
    }

    #[test]
    fn test_from_config_plays_with_entropy() {
        let mut engine = RoundEngine::from_config(JackpotConfig::testing(), "entropy").unwrap();
        assert_eq!(engine.player_id(), "entropy");

        let numbers = engine.quick_pick().unwrap();
        let result = engine.play(&Ticket::new(numbers, false, 35).unwrap()).unwrap();

        assert_eq!(result.cost, 5);
        assert_eq!(result.draw.winning_numbers.len(), NUMBERS_PER_DRAW);
        assert!(!result.draw.winning_numbers.contains(&result.draw.bonus));
        assert_eq!(engine.state().games_played, 1);
        assert!(result.persisted);
    }

    #[test]
    fn test_player_id_validation() {
        assert!(validate_player_id("alice_01").is_ok());
        assert!(validate_player_id("").is_err());
        assert!(validate_player_id("bob:state").is_err());
        assert!(validate_player_id("white space").is_err());
    }
}
