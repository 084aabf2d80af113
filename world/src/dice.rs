//! Dice budget for a single exploration segment.

use dice_defence_core::RandomSource;

/// Tracks the dice remaining in the current exploration segment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiceEconomy {
    dice_left: u32,
}

impl DiceEconomy {
    /// Creates an economy holding `base` dice.
    #[must_use]
    pub const fn new(base: u32) -> Self {
        Self { dice_left: base }
    }

    /// Dice remaining in the segment.
    #[must_use]
    pub const fn dice_left(&self) -> u32 {
        self.dice_left
    }

    /// Replaces the remaining dice with a fresh budget.
    pub fn reset(&mut self, base: u32) {
        self.dice_left = base;
    }

    /// Consumes one die and returns its face.
    ///
    /// Returns `None` without touching the budget when no dice remain.
    pub fn roll(&mut self, random: &mut dyn RandomSource) -> Option<u8> {
        self.dice_left = self.dice_left.checked_sub(1)?;
        Some(random.roll_die())
    }

    /// Credits extra dice and returns the new total.
    pub fn add_dice(&mut self, extra: u32) -> u32 {
        self.dice_left = self.dice_left.saturating_add(extra);
        self.dice_left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_defence_core::{ScriptedRandom, SeededRandom};

    #[test]
    fn roll_consumes_exactly_one_die() {
        let mut dice = DiceEconomy::new(2);
        let mut random = ScriptedRandom::new([3, 5]);
        assert_eq!(dice.roll(&mut random), Some(4));
        assert_eq!(dice.dice_left(), 1);
        assert_eq!(dice.roll(&mut random), Some(6));
        assert_eq!(dice.dice_left(), 0);
    }

    #[test]
    fn empty_budget_rolls_nothing() {
        let mut dice = DiceEconomy::new(0);
        let mut random = ScriptedRandom::new([2]);
        assert_eq!(dice.roll(&mut random), None);
        assert_eq!(dice.dice_left(), 0);
        assert_eq!(random.remaining(), 1, "no draw is spent on a failed roll");
    }

    #[test]
    fn faces_stay_on_the_die() {
        let mut dice = DiceEconomy::new(500);
        let mut random = SeededRandom::new(7);
        while let Some(face) = dice.roll(&mut random) {
            assert!((1..=6).contains(&face));
        }
        assert_eq!(dice.dice_left(), 0);
    }

    #[test]
    fn reset_and_add_adjust_budget() {
        let mut dice = DiceEconomy::new(1);
        assert_eq!(dice.add_dice(2), 3);
        assert_eq!(dice.add_dice(0), 3);
        dice.reset(5);
        assert_eq!(dice.dice_left(), 5);
        assert_eq!(dice.add_dice(u32::MAX), u32::MAX);
    }
}
