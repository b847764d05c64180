//! Random sources for dice.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

use super::Die;

/// Something that can produce die faces.
pub trait Roller {
    /// Roll one die, returning a face in `1..=die.sides()`.
    fn roll(&mut self, die: Die) -> u32;

    /// Roll a single d20.
    fn d20(&mut self) -> u32 {
        self.roll(Die::D20)
    }
}

impl Roller for StdRng {
    fn roll(&mut self, die: Die) -> u32 {
        self.random_range(1..=die.sides())
    }
}

/// A roller that replays a fixed sequence of faces.
///
/// Faces larger than the die are clamped to its highest face. Once the
/// script runs out every further roll comes up 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    faces: VecDeque<u32>,
}

impl ScriptedRolls {
    /// Create a roller that will return `faces` in order.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Queue more faces after the current script.
    pub fn push(&mut self, faces: impl IntoIterator<Item = u32>) {
        self.faces.extend(faces);
    }

    /// Number of scripted faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl Roller for ScriptedRolls {
    fn roll(&mut self, die: Die) -> u32 {
        match self.faces.pop_front() {
            Some(face) => face.clamp(1, die.sides()),
            None => {
                tracing::warn!(%die, "scripted rolls exhausted, rolling 1");
                1
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn std_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let face = rng.roll(Die::D6);
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn std_rng_deterministic_with_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(a.d20(), b.d20());
        }
    }

    #[test]
    fn scripted_rolls_replay_in_order() {
        let mut rolls = ScriptedRolls::new([15, 10, 3]);
        assert_eq!(rolls.d20(), 15);
        assert_eq!(rolls.d20(), 10);
        assert_eq!(rolls.remaining(), 1);
        assert_eq!(rolls.roll(Die::D4), 3);
        assert_eq!(rolls.remaining(), 0);
    }

    #[test]
    fn scripted_rolls_clamp_and_exhaust() {
        let mut rolls = ScriptedRolls::new([9]);
        assert_eq!(rolls.roll(Die::D6), 6);
        assert_eq!(rolls.d20(), 1);
    }

    #[test]
    fn scripted_rolls_push() {
        let mut rolls = ScriptedRolls::default();
        rolls.push([4, 5]);
        assert_eq!(rolls.roll(Die::D6), 4);
        assert_eq!(rolls.roll(Die::D6), 5);
    }
}
