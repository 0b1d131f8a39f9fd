//! Dice rolling.
//!
//! Battles and danger-zone crossings draw their dice through [`DiceRoller`] so
//! tests can rig the outcome. Any `Fn() -> i32` closure is a roller.

use std::sync::{Mutex, PoisonError};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const DICE_SIDES: i32 = 6;

pub trait DiceRoller: Send + Sync {
    /// Returns a value in `1..=6`.
    fn roll(&self) -> i32;
}

impl<F> DiceRoller for F
where
    F: Fn() -> i32 + Send + Sync,
{
    fn roll(&self) -> i32 {
        self()
    }
}

/// A fair six-sided die backed by a small, fast RNG.
pub struct RandomDice {
    rng: Mutex<SmallRng>,
}

impl RandomDice {
    pub fn new() -> Self {
        RandomDice {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    /// A reproducible die, for replays and benchmarks.
    pub fn seeded(seed: u64) -> Self {
        RandomDice {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceRoller for RandomDice {
    fn roll(&self) -> i32 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(1..=DICE_SIDES)
    }
}
