//! Injectable randomness. Every random draw in the simulation goes through [`RandomSource`].

use std::{collections::VecDeque, fmt};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniformly distributed integers.
pub trait RandomSource: fmt::Debug {
    /// Draws a value uniformly from `0..bound`. A zero bound yields zero.
    fn below(&mut self, bound: u32) -> u32;

    /// Rolls a six-sided die.
    fn roll_die(&mut self) -> u8 {
        // below(6) < 6, so the face always fits.
        (self.below(6) + 1) as u8
    }

    /// Draws a value uniformly from `low..=high`. Returns `low` when the range is empty.
    fn inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.below((high - low).saturating_add(1))
    }

    /// Draws an index into a collection of `len` elements.
    fn index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let bound = u32::try_from(len).unwrap_or(u32::MAX);
        usize::try_from(self.below(bound)).ok()
    }
}

/// Reproducible random source backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    rng: ChaCha8Rng,
}

impl SeededRandom {
    /// Creates a random source seeded with the provided value.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.rng.gen_range(0..bound)
    }
}

/// Random source that replays a fixed sequence of draws.
///
/// Each draw is reduced modulo the requested bound. Once the script runs out
/// every draw yields zero.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    draws: VecDeque<u32>,
}

impl ScriptedRandom {
    /// Creates a scripted source from the provided draws.
    pub fn new(draws: impl IntoIterator<Item = u32>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of scripted draws not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedRandom {
    fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.draws.pop_front().map_or(0, |draw| draw % bound)
    }
}
