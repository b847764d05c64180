//! Weapon damage specs in `[count]dN` form.

use serde::{Deserialize, Serialize};

use super::roll::{DieResult, RollResult};
use super::{Die, Roller};
use crate::error::{MechError, MechResult};

/// Most dice a spec may name.
pub const MAX_DICE: u32 = 100;

/// Most sides a die in a spec may have.
pub const MAX_SIDES: u32 = 1000;

/// A number of identical dice, e.g. `2d6` or `d8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpec {
    /// How many dice to roll (at least one).
    pub count: u32,
    /// The die to roll.
    pub die: Die,
}

impl DiceSpec {
    /// Parse a spec such as `"2d6"`, `"d8"` or `"1D12"`.
    ///
    /// The count is optional and defaults to one. Anything else, including
    /// trailing modifiers, is rejected.
    pub fn parse(spec: &str) -> MechResult<Self> {
        let malformed = || MechError::MalformedDamageSpec(spec.to_string());
        let lower = spec.trim().to_lowercase();
        let (count_str, sides_str) = lower.split_once('d').ok_or_else(malformed)?;

        let count = if count_str.is_empty() {
            1
        } else {
            if !count_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            count_str.parse::<u32>().map_err(|_| malformed())?
        };
        let digits = sides_str.bytes().all(|b| b.is_ascii_digit());
        if !(1..=MAX_DICE).contains(&count) || !digits {
            return Err(malformed());
        }
        let sides = sides_str.parse::<u32>().map_err(|_| malformed())?;
        if sides > MAX_SIDES {
            return Err(malformed());
        }
        let die = Die::from_sides(sides).ok_or_else(malformed)?;

        Ok(Self { count, die })
    }

    /// The same dice, twice as many of them (critical hits).
    pub fn doubled(self) -> Self {
        Self {
            count: self.count.saturating_mul(2),
            ..self
        }
    }

    /// Roll every die in the spec.
    pub fn roll(&self, roller: &mut impl Roller) -> RollResult {
        let dice = (0..self.count)
            .map(|_| DieResult {
                die: self.die,
                value: roller.roll(self.die),
            })
            .collect();
        RollResult { dice }
    }
}

impl std::fmt::Display for DiceSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.count, self.die)
    }
}

impl std::str::FromStr for DiceSpec {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRolls;

    #[test]
    fn parse_with_and_without_count() {
        assert_eq!(
            DiceSpec::parse("2d6").unwrap(),
            DiceSpec {
                count: 2,
                die: Die::D6
            }
        );
        assert_eq!(
            DiceSpec::parse("d8").unwrap(),
            DiceSpec {
                count: 1,
                die: Die::D8
            }
        );
        assert_eq!(DiceSpec::parse(" 1D12 ").unwrap().die, Die::D12);
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "2", "d", "2d", "0d6", "2d1", "2d6+3", "xd6", "2dd6", "-1d6"] {
            assert_eq!(
                DiceSpec::parse(bad),
                Err(MechError::MalformedDamageSpec(bad.to_string())),
                "{bad} should not parse"
            );
        }
    }

    #[test]
    fn parse_rejects_absurd_sizes() {
        for bad in ["3000000000d6", "101d6", "2d1001", "99999999999999999999d6"] {
            assert_eq!(
                DiceSpec::parse(bad),
                Err(MechError::MalformedDamageSpec(bad.to_string())),
                "{bad} should not parse"
            );
        }
        assert_eq!(DiceSpec::parse("100d1000").unwrap().count, 100);
    }

    #[test]
    fn doubled_saturates() {
        let spec = DiceSpec {
            count: u32::MAX,
            die: Die::D6,
        };
        assert_eq!(spec.doubled().count, u32::MAX);
    }

    #[test]
    fn doubled_keeps_die() {
        let spec = DiceSpec::parse("2d6").unwrap().doubled();
        assert_eq!(spec.count, 4);
        assert_eq!(spec.die, Die::D6);
    }

    #[test]
    fn roll_uses_every_die() {
        let mut rolls = ScriptedRolls::new([4, 5]);
        let result = DiceSpec::parse("2d6").unwrap().roll(&mut rolls);
        assert_eq!(result.values(), vec![4, 5]);
        assert_eq!(result.total(), 9);
    }

    #[test]
    fn display_round_trips() {
        let spec: DiceSpec = "d10".parse().unwrap();
        assert_eq!(spec.to_string(), "1d10");
    }
}
