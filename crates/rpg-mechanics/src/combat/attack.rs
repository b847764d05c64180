//! Weapon attacks: the d20 to-hit roll and the damage roll that follows.

use serde::{Deserialize, Serialize};

use crate::character::{Ability, Character, DamageOutcome};
use crate::dice::{DiceSpec, RollResult, Roller};
use crate::error::MechResult;

/// Advantage state for d20 rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Advantage {
    /// Roll one d20.
    #[default]
    Normal,
    /// Roll two d20s and keep the higher.
    Advantage,
    /// Roll two d20s and keep the lower.
    Disadvantage,
}

impl Advantage {
    /// Roll the d20s this state calls for. Returns every face and the kept one.
    pub fn roll_d20(self, roller: &mut impl Roller) -> (Vec<u32>, u32) {
        match self {
            Self::Normal => {
                let roll = roller.d20();
                (vec![roll], roll)
            }
            Self::Advantage | Self::Disadvantage => {
                let a = roller.d20();
                let b = roller.d20();
                let kept = if self == Self::Advantage {
                    a.max(b)
                } else {
                    a.min(b)
                };
                (vec![a, b], kept)
            }
        }
    }
}

/// How an attack landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// The kept die was a 20: always hits, and damage dice are doubled.
    CriticalHit,
    /// The total met the target's armor class.
    Hit,
    /// The total fell short.
    Miss,
    /// The kept die was a 1: always misses.
    CriticalMiss,
}

/// The full breakdown of an attack roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackRoll {
    /// Name of the weapon used.
    pub weapon: String,
    /// Every d20 rolled (two with advantage or disadvantage).
    pub d20s: Vec<u32>,
    /// The d20 that counts.
    pub roll: u32,
    /// The weapon's governing ability.
    pub ability: Ability,
    /// That ability's modifier.
    pub ability_modifier: i32,
    /// The attacker's proficiency bonus.
    pub proficiency: i32,
    /// The armor class the attack was made against.
    pub target_ac: i32,
    /// Whether and how it hit.
    pub outcome: AttackOutcome,
}

impl AttackRoll {
    /// Roll plus ability modifier plus proficiency.
    pub fn total(&self) -> i32 {
        self.roll as i32 + self.ability_modifier + self.proficiency
    }

    /// Whether the attack connects.
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Hit | AttackOutcome::CriticalHit)
    }

    /// Whether damage dice should be doubled.
    pub fn is_critical(&self) -> bool {
        self.outcome == AttackOutcome::CriticalHit
    }

    /// `roll: 15, Str: 3, proficiency: 2`
    pub fn breakdown(&self) -> String {
        format!(
            "roll: {}, {}: {}, proficiency: {}",
            self.roll, self.ability, self.ability_modifier, self.proficiency
        )
    }
}

/// The full breakdown of a damage roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageRoll {
    /// Name of the weapon used.
    pub weapon: String,
    /// The dice that were rolled (already doubled on a critical).
    pub dice: RollResult,
    /// The weapon's governing ability.
    pub ability: Ability,
    /// Modifier added once to the dice total.
    pub modifier: i32,
    /// Whether the dice were doubled.
    pub critical: bool,
    /// Damage dealt; a large negative modifier bottoms out at zero.
    pub total: u32,
    /// What the damage did to the target.
    pub outcome: DamageOutcome,
}

impl DamageRoll {
    /// `roll: [4, 5], Str: 3`
    pub fn breakdown(&self) -> String {
        let values: Vec<String> = self.dice.values().iter().map(u32::to_string).collect();
        format!(
            "roll: [{}], {}: {}",
            values.join(", "),
            self.ability,
            self.modifier
        )
    }
}

impl Character {
    /// Make an attack roll against `target` with a named weapon.
    ///
    /// The target is not changed; roll damage separately on a hit.
    pub fn attack(
        &self,
        target: &Character,
        weapon_name: &str,
        advantage: Advantage,
        roller: &mut impl Roller,
    ) -> MechResult<AttackRoll> {
        let weapon = self.weapon(weapon_name)?;
        let (d20s, roll) = advantage.roll_d20(roller);
        let ability_modifier = self.modifier(weapon.ability);
        let proficiency = self.proficiency();
        let total = roll as i32 + ability_modifier + proficiency;

        let outcome = match roll {
            20 => AttackOutcome::CriticalHit,
            1 => AttackOutcome::CriticalMiss,
            _ if total >= target.armor_class => AttackOutcome::Hit,
            _ => AttackOutcome::Miss,
        };

        Ok(AttackRoll {
            weapon: weapon_name.to_string(),
            d20s,
            roll,
            ability: weapon.ability,
            ability_modifier,
            proficiency,
            target_ac: target.armor_class,
            outcome,
        })
    }

    /// Roll a weapon's damage and apply it to `target`.
    pub fn roll_damage(
        &self,
        target: &mut Character,
        weapon_name: &str,
        critical: bool,
        roller: &mut impl Roller,
    ) -> MechResult<DamageRoll> {
        let weapon = self.weapon(weapon_name)?;
        let mut spec = DiceSpec::parse(&weapon.damage)?;
        if critical {
            spec = spec.doubled();
        }
        let dice = spec.roll(roller);
        let modifier = self.modifier(weapon.ability);
        let total = i32::try_from(dice.total())
            .unwrap_or(i32::MAX)
            .saturating_add(modifier)
            .max(0)
            .unsigned_abs();
        let outcome = target.take_damage(total);

        Ok(DamageRoll {
            weapon: weapon_name.to_string(),
            dice,
            ability: weapon.ability,
            modifier,
            critical,
            total,
            outcome,
        })
    }
}
