use crate::common::traits::DrawSource;
use crate::config::{GameConfig, MIN_NUMBER, NUMBERS_PER_DRAW};
use crate::errors::{JackpotResult, RoundError};
use crate::lottery::types::Draw;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeSet, VecDeque};

/// Draws unique numbers by sampling until enough distinct values turn up
pub struct DrawGenerator<R: Rng> {
    rng: R,
    max_number: u8,
    max_attempts: u32,
}

impl DrawGenerator<StdRng> {
    /// Generator backed by OS entropy
    pub fn from_entropy(game: &GameConfig) -> Self {
        Self::new(StdRng::from_entropy(), game)
    }

    /// Reproducible generator for replays and tests
    pub fn seeded(seed: u64, game: &GameConfig) -> Self {
        Self::new(StdRng::seed_from_u64(seed), game)
    }
}

impl<R: Rng> DrawGenerator<R> {
    pub fn new(rng: R, game: &GameConfig) -> Self {
        Self {
            rng,
            max_number: game.max_number,
            max_attempts: game.max_draw_attempts,
        }
    }

    /// `count` distinct numbers in `[1, max] \ exclude`, ascending.
    ///
    /// Fails with `GenerationExhausted` when the attempt cap runs out or the
    /// request cannot be satisfied at all.
    pub fn generate(
        &mut self,
        count: usize,
        max: u8,
        exclude: &BTreeSet<u8>,
    ) -> Result<Vec<u8>, RoundError> {
        let available = (MIN_NUMBER..=max).filter(|n| !exclude.contains(n)).count();
        if count > available {
            return Err(RoundError::GenerationExhausted {
                requested: count,
                collected: 0,
                attempts: 0,
            });
        }

        let mut picked = BTreeSet::new();
        let mut attempts = 0;
        while picked.len() < count {
            if attempts >= self.max_attempts {
                return Err(RoundError::GenerationExhausted {
                    requested: count,
                    collected: picked.len(),
                    attempts,
                });
            }
            attempts += 1;

            let candidate = self.rng.gen_range(MIN_NUMBER..=max);
            if !exclude.contains(&candidate) {
                picked.insert(candidate);
            }
        }

        // BTreeSet iterates in ascending order
        Ok(picked.into_iter().collect())
    }

    /// Single bonus number outside `exclude`
    pub fn draw_bonus(&mut self, max: u8, exclude: &BTreeSet<u8>) -> Result<u8, RoundError> {
        let mut numbers = self.generate(1, max, exclude)?;
        numbers.pop().ok_or(RoundError::GenerationExhausted {
            requested: 1,
            collected: 0,
            attempts: 0,
        })
    }
}

impl<R: Rng + Send> DrawSource for DrawGenerator<R> {
    fn draw(&mut self) -> JackpotResult<Draw> {
        let winning_numbers = self.generate(NUMBERS_PER_DRAW, self.max_number, &BTreeSet::new())?;
        let exclude: BTreeSet<u8> = winning_numbers.iter().copied().collect();
        let bonus = self.draw_bonus(self.max_number, &exclude)?;

        Ok(Draw {
            winning_numbers,
            bonus,
        })
    }

    fn quick_pick(&mut self) -> JackpotResult<Vec<u8>> {
        Ok(self.generate(NUMBERS_PER_DRAW, self.max_number, &BTreeSet::new())?)
    }
}

/// Replays a fixed sequence of draws, then reports exhaustion
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    draws: VecDeque<Draw>,
}

impl ScriptedDraws {
    pub fn new(draws: impl IntoIterator<Item = Draw>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }

    fn next_draw(&mut self) -> Result<Draw, RoundError> {
        self.draws.pop_front().ok_or(RoundError::GenerationExhausted {
            requested: NUMBERS_PER_DRAW,
            collected: 0,
            attempts: 0,
        })
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self) -> JackpotResult<Draw> {
        Ok(self.next_draw()?)
    }

    /// Uses the winning numbers of the next scripted draw
    fn quick_pick(&mut self) -> JackpotResult<Vec<u8>> {
        Ok(self.next_draw()?.winning_numbers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn game() -> GameConfig {
        GameConfig::default()
    }

    #[test]
    fn test_generate_unique_sorted_in_range() {
        let mut generator = DrawGenerator::seeded(7, &game());

        for _ in 0..500 {
            let numbers = generator.generate(6, 35, &BTreeSet::new()).unwrap();
            assert_eq!(numbers.len(), 6);
            assert!(numbers.windows(2).all(|w| w[0] < w[1]));
            assert!(numbers.iter().all(|&n| (1..=35).contains(&n)));
        }
    }

    #[test]
    fn test_draw_bonus_never_a_winner() {
        let mut generator = DrawGenerator::seeded(42, &game());

        for _ in 0..500 {
            let draw = generator.draw().unwrap();
            assert_eq!(draw.winning_numbers.len(), 6);
            assert!(!draw.winning_numbers.contains(&draw.bonus));
            assert!((1..=35).contains(&draw.bonus));
        }
    }

    #[test]
    fn test_exclusion_is_respected() {
        let mut generator = DrawGenerator::seeded(3, &game());
        let exclude: BTreeSet<u8> = (1..=30).collect();

        let numbers = generator.generate(5, 35, &exclude).unwrap();
        assert_eq!(numbers, vec![31, 32, 33, 34, 35]);
    }

    #[test]
    fn test_impossible_request_fails_fast() {
        let mut generator = DrawGenerator::seeded(3, &game());
        let exclude: BTreeSet<u8> = (1..=33).collect();

        let err = generator.generate(3, 35, &exclude).unwrap_err();
        assert_eq!(
            err,
            RoundError::GenerationExhausted {
                requested: 3,
                collected: 0,
                attempts: 0
            }
        );
    }

    #[test]
    fn test_constant_source_exhausts() {
        // A source that never changes yields one distinct value at most
        let mut generator = DrawGenerator::new(StepRng::new(0, 0), &game());

        match generator.generate(6, 35, &BTreeSet::new()) {
            Err(RoundError::GenerationExhausted {
                requested,
                collected,
                attempts,
            }) => {
                assert_eq!(requested, 6);
                assert_eq!(collected, 1);
                assert_eq!(attempts, 1000);
            }
            other => panic!("Expected exhaustion, got {:?}", other),
        }
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let mut a = DrawGenerator::seeded(99, &game());
        let mut b = DrawGenerator::seeded(99, &game());

        assert_eq!(a.draw().unwrap(), b.draw().unwrap());
        assert_eq!(a.quick_pick().unwrap(), b.quick_pick().unwrap());
    }

    #[test]
    fn test_scripted_draws_run_out() {
        let draw = Draw {
            winning_numbers: vec![1, 2, 3, 4, 5, 6],
            bonus: 9,
        };
        let mut scripted = ScriptedDraws::new(vec![draw.clone()]);

        assert_eq!(scripted.draw().unwrap(), draw);
        assert_eq!(scripted.remaining(), 0);
        assert!(scripted.draw().is_err());
    }
}
