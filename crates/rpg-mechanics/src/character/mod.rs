//! Characters: stats, checks, hit points and experience.
//!
//! A character is stored as a plain attribute bag whose keys follow the
//! YAML templates the game master writes (`AC`, `XP`, `class_`, ...), so a
//! serialized character can be dropped straight back into a template file.

pub mod ability;
pub mod field;
pub mod progression;

pub use ability::{Abilities, Ability, Skill, ability_modifier};
pub use field::CharacterField;
pub use progression::{LEVEL_XP, MAX_LEVEL, proficiency_bonus, xp_for_next_level};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dice::Roller;
use crate::error::{MechError, MechResult};

/// A weapon or damaging spell a character can attack with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Damage dice in `[count]dN` form. Parsed when damage is rolled.
    pub damage: String,
    /// The ability whose modifier applies to attack and damage rolls.
    #[serde(rename = "modifier")]
    pub ability: Ability,
}

impl Weapon {
    /// Create a weapon from a damage spec and governing ability.
    pub fn new(damage: impl Into<String>, ability: Ability) -> Self {
        Self {
            damage: damage.into(),
            ability,
        }
    }
}

/// Death saving throw tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSaves {
    /// Successful saves.
    pub success: u8,
    /// Failed saves.
    pub fail: u8,
}

/// What a hit did to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Still standing with this many hit points.
    Survived {
        /// Hit points left.
        current_hp: i32,
    },
    /// Hit points dropped below zero.
    Died,
}

/// Rough description of how hurt a character is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthBand {
    /// At full hit points.
    Unharmed,
    /// Above half.
    Alright,
    /// Above a tenth.
    NotGreat,
    /// A tenth or less.
    MortalPeril,
}

impl std::fmt::Display for HealthBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unharmed => write!(f, "completely unharmed!"),
            Self::Alright => write!(f, "feeling alright"),
            Self::NotGreat => write!(f, "not feeling great"),
            Self::MortalPeril => write!(f, "in mortal peril!"),
        }
    }
}

/// The result of an ability or skill check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckRoll {
    /// The ability the check was made against.
    pub ability: Ability,
    /// The d20 face, or 10 for a passive check.
    pub roll: u32,
    /// The ability modifier added to the roll.
    pub modifier: i32,
    /// Whether this was a passive check.
    pub passive: bool,
}

impl CheckRoll {
    /// Roll plus modifier.
    pub fn total(&self) -> i32 {
        self.roll as i32 + self.modifier
    }

    /// The summands, `[roll, modifier]`.
    pub fn parts(&self) -> [i32; 2] {
        [self.roll as i32, self.modifier]
    }
}

impl std::fmt::Display for CheckRoll {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} + {})", self.total(), self.roll, self.modifier)
    }
}

/// A combatant's full sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CharacterRecord")]
pub struct Character {
    /// Display name, unique within a room.
    pub name: String,
    /// Character level, 1 to 20.
    pub level: u8,
    /// Race, for display.
    pub race: String,
    /// Class, for display.
    #[serde(rename = "class_")]
    pub class: String,
    /// Armor class.
    #[serde(rename = "AC")]
    pub armor_class: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Current hit points, never above `max_hp`.
    pub current_hp: i32,
    /// Ability scores.
    pub abilities: Abilities,
    /// Experience points.
    #[serde(rename = "XP")]
    pub xp: u32,
    /// Weapons and damaging spells by name.
    pub weapons: BTreeMap<String, Weapon>,
    /// Whether the character is unconscious.
    pub unconscious: bool,
    /// Death saving throw tallies.
    pub death_saves: DeathSaves,
}

/// The stored shape of a character, before validation.
#[derive(Deserialize)]
struct CharacterRecord {
    name: String,
    level: u8,
    #[serde(default)]
    race: String,
    #[serde(rename = "class_", alias = "class", default)]
    class: String,
    #[serde(rename = "AC", alias = "ac", alias = "armor_class")]
    armor_class: i32,
    max_hp: i32,
    #[serde(default)]
    current_hp: Option<i32>,
    #[serde(default)]
    abilities: Abilities,
    #[serde(rename = "XP", alias = "xp", default)]
    xp: u32,
    #[serde(default)]
    weapons: Option<BTreeMap<String, Weapon>>,
    #[serde(default)]
    unconscious: bool,
    #[serde(default)]
    death_saves: DeathSaves,
}

impl TryFrom<CharacterRecord> for Character {
    type Error = MechError;

    fn try_from(record: CharacterRecord) -> Result<Self, Self::Error> {
        if !(1..=MAX_LEVEL).contains(&record.level) {
            return Err(MechError::InvalidFieldValue {
                field: "level".to_string(),
                value: record.level.into(),
            });
        }
        if record.max_hp < 1 {
            return Err(MechError::InvalidFieldValue {
                field: "max_hp".to_string(),
                value: record.max_hp.into(),
            });
        }
        let current_hp = record
            .current_hp
            .map_or(record.max_hp, |hp| hp.min(record.max_hp));

        Ok(Self {
            name: record.name,
            level: record.level,
            race: record.race,
            class: record.class,
            armor_class: record.armor_class,
            max_hp: record.max_hp,
            current_hp,
            abilities: record.abilities,
            xp: record.xp,
            weapons: record.weapons.unwrap_or_default(),
            unconscious: record.unconscious,
            death_saves: record.death_saves,
        })
    }
}

impl Character {
    /// A level 1 character at full health with all abilities at 10.
    pub fn new(name: impl Into<String>, max_hp: i32, armor_class: i32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            name: name.into(),
            level: 1,
            race: String::new(),
            class: String::new(),
            armor_class,
            max_hp,
            current_hp: max_hp,
            abilities: Abilities::default(),
            xp: 0,
            weapons: BTreeMap::new(),
            unconscious: false,
            death_saves: DeathSaves::default(),
        }
    }

    /// Set the ability scores, builder style.
    pub fn with_abilities(mut self, abilities: Abilities) -> Self {
        self.abilities = abilities;
        self
    }

    /// Add a weapon, builder style.
    pub fn with_weapon(mut self, name: impl Into<String>, weapon: Weapon) -> Self {
        self.weapons.insert(name.into(), weapon);
        self
    }

    /// Set the level, builder style. Clamped to 1..=20.
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = level.clamp(1, MAX_LEVEL);
        self
    }

    /// Set race and class, builder style.
    pub fn with_identity(mut self, race: impl Into<String>, class: impl Into<String>) -> Self {
        self.race = race.into();
        self.class = class.into();
        self
    }

    /// First word of the name.
    pub fn shortname(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    /// Modifier for one ability.
    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    /// Proficiency bonus at the current level.
    pub fn proficiency(&self) -> i32 {
        proficiency_bonus(self.level)
    }

    /// Look up a weapon by name, exactly or else ignoring case.
    pub fn weapon(&self, name: &str) -> MechResult<&Weapon> {
        self.weapons
            .get(name)
            .or_else(|| {
                self.weapons
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, w)| w)
            })
            .ok_or_else(|| MechError::UnknownWeapon {
                character: self.name.clone(),
                weapon: name.to_string(),
            })
    }

    /// Roll an ability check. A passive check takes 10 instead of a d20.
    pub fn ability_check(
        &self,
        ability: Ability,
        passive: bool,
        roller: &mut impl Roller,
    ) -> CheckRoll {
        let roll = if passive { 10 } else { roller.d20() };
        CheckRoll {
            ability,
            roll,
            modifier: self.modifier(ability),
            passive,
        }
    }

    /// Roll a skill check against the skill's governing ability.
    pub fn skill_check(&self, skill: Skill, passive: bool, roller: &mut impl Roller) -> CheckRoll {
        self.ability_check(skill.ability(), passive, roller)
    }

    /// Roll a check named by either an ability or a skill.
    pub fn check(&self, name: &str, passive: bool, roller: &mut impl Roller) -> MechResult<CheckRoll> {
        if let Some(ability) = Ability::parse(name) {
            return Ok(self.ability_check(ability, passive, roller));
        }
        let skill = Skill::resolve(name)?;
        Ok(self.skill_check(skill, passive, roller))
    }

    /// Lose hit points. Dropping below zero kills the character.
    pub fn take_damage(&mut self, amount: u32) -> DamageOutcome {
        self.current_hp = self.current_hp.saturating_sub_unsigned(amount);
        if self.current_hp < 0 {
            DamageOutcome::Died
        } else {
            DamageOutcome::Survived {
                current_hp: self.current_hp,
            }
        }
    }

    /// Regain hit points, never past the maximum. Returns the new total.
    pub fn heal(&mut self, amount: u32) -> i32 {
        self.current_hp = self
            .current_hp
            .saturating_add_unsigned(amount)
            .min(self.max_hp);
        self.current_hp
    }

    /// Restore every hit point.
    pub fn rest(&mut self) {
        self.current_hp = self.max_hp;
    }

    /// Gain experience, levelling up as many times as it pays for.
    ///
    /// Returns the number of levels gained; the level never passes 20.
    pub fn gain_xp(&mut self, amount: u32) -> u8 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while let Some(threshold) = xp_for_next_level(self.level) {
            if self.xp < threshold {
                break;
            }
            self.level += 1;
            gained += 1;
        }
        gained
    }

    /// How hurt the character looks.
    pub fn health(&self) -> HealthBand {
        let ratio = f64::from(self.current_hp) / f64::from(self.max_hp);
        if self.current_hp >= self.max_hp {
            HealthBand::Unharmed
        } else if ratio > 0.5 {
            HealthBand::Alright
        } else if ratio > 0.1 {
            HealthBand::NotGreat
        } else {
            HealthBand::MortalPeril
        }
    }
}

impl std::fmt::Display for Character {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} {} {})",
            self.name, self.race, self.class, self.level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRolls;
    use proptest::prelude::*;

    fn aria() -> Character {
        Character::new("Aria Swiftwind", 20, 14)
            .with_identity("Elf", "Rogue")
            .with_abilities(Abilities::default().with(Ability::Dex, 15).with(Ability::Wis, 8))
            .with_weapon("dagger", Weapon::new("1d4", Ability::Dex))
    }

    #[test]
    fn display_and_shortname() {
        let c = aria();
        assert_eq!(c.to_string(), "Aria Swiftwind (Elf Rogue 1)");
        assert_eq!(c.shortname(), "Aria");
    }

    #[test]
    fn ability_check_adds_modifier() {
        let c = aria();
        let mut rolls = ScriptedRolls::new([13]);
        let check = c.ability_check(Ability::Dex, false, &mut rolls);
        assert_eq!(check.total(), 15);
        assert_eq!(check.parts(), [13, 2]);
        assert_eq!(check.to_string(), "15 (13 + 2)");
    }

    #[test]
    fn passive_check_takes_ten() {
        let c = aria();
        let mut rolls = ScriptedRolls::default();
        let check = c.skill_check(Skill::Perception, true, &mut rolls);
        assert_eq!(check.roll, 10);
        assert_eq!(check.total(), 9);
        assert_eq!(check.ability, Ability::Wis);
    }

    #[test]
    fn check_by_name() {
        let c = aria();
        let mut rolls = ScriptedRolls::new([5, 5]);
        assert_eq!(c.check("Dex", false, &mut rolls).unwrap().total(), 7);
        assert_eq!(c.check("stealth", false, &mut rolls).unwrap().ability, Ability::Dex);
        assert_eq!(
            c.check("basket weaving", false, &mut rolls),
            Err(MechError::UnknownSkillOrAbility("basket weaving".to_string()))
        );
    }

    #[test]
    fn zero_damage_and_zero_healing_change_nothing() {
        let mut c = aria();
        c.current_hp = 12;
        assert_eq!(c.take_damage(0), DamageOutcome::Survived { current_hp: 12 });
        assert_eq!(c.heal(0), 12);
        assert_eq!(c.current_hp, 12);
    }

    #[test]
    fn damage_to_zero_survives_below_zero_dies() {
        let mut c = aria();
        assert_eq!(c.take_damage(20), DamageOutcome::Survived { current_hp: 0 });
        assert_eq!(c.take_damage(1), DamageOutcome::Died);
        assert_eq!(c.current_hp, -1);
    }

    proptest! {
        #[test]
        fn heal_never_exceeds_max(start in 0i32..=20, amount in 0u32..1_000_000) {
            let mut c = aria();
            c.current_hp = start;
            let hp = c.heal(amount);
            prop_assert!(hp <= c.max_hp);
            prop_assert_eq!(hp, (start + amount as i32).min(c.max_hp));
        }
    }

    #[test]
    fn gain_xp_single_level() {
        let mut c = aria();
        assert_eq!(c.gain_xp(299), 0);
        assert_eq!(c.level, 1);
        assert_eq!(c.gain_xp(1), 1);
        assert_eq!(c.level, 2);
        assert_eq!(c.xp, 300);
    }

    #[test]
    fn gain_xp_loops_over_several_levels() {
        let mut c = aria();
        assert_eq!(c.gain_xp(6_500), 4);
        assert_eq!(c.level, 5);
        assert_eq!(c.proficiency(), 3);
    }

    #[test]
    fn gain_xp_caps_at_twenty() {
        let mut c = aria();
        assert_eq!(c.gain_xp(10_000_000), 19);
        assert_eq!(c.level, 20);
        assert_eq!(c.gain_xp(1_000), 0);
        assert_eq!(c.level, 20);
    }

    #[test]
    fn health_bands() {
        let mut c = Character::new("Borin", 20, 10);
        assert_eq!(c.health(), HealthBand::Unharmed);
        c.current_hp = 15;
        assert_eq!(c.health(), HealthBand::Alright);
        c.current_hp = 10;
        assert_eq!(c.health(), HealthBand::NotGreat);
        c.current_hp = 2;
        assert_eq!(c.health(), HealthBand::MortalPeril);
        assert_eq!(c.health().to_string(), "in mortal peril!");
    }

    #[test]
    fn weapon_lookup_ignores_case() {
        let c = aria();
        assert!(c.weapon("Dagger").is_ok());
        assert!(matches!(
            c.weapon("axe"),
            Err(MechError::UnknownWeapon { .. })
        ));
    }

    #[test]
    fn persist_and_reload_is_identical() {
        let mut c = aria().with_level(3);
        c.current_hp = 7;
        c.xp = 950;
        c.death_saves.fail = 1;
        let value = serde_json::to_value(&c).unwrap();
        assert_eq!(value["AC"], 14);
        assert_eq!(value["class_"], "Rogue");
        assert_eq!(value["weapons"]["dagger"]["modifier"], "Dex");
        let back: Character = serde_json::from_value(value).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn template_defaults_fill_in() {
        let value = serde_json::json!({
            "name": "Goblin",
            "level": 1,
            "race": "Goblin",
            "class_": "Warrior",
            "AC": 15,
            "max_hp": 7,
            "abilities": {"Str": 8, "Dex": 14, "Con": 10, "Int": 10, "Wis": 8, "Cha": 8},
            "weapons": {"scimitar": {"damage": "1d6", "modifier": "Dex"}}
        });
        let goblin: Character = serde_json::from_value(value).unwrap();
        assert_eq!(goblin.current_hp, 7);
        assert_eq!(goblin.xp, 0);
        assert!(!goblin.unconscious);
        assert_eq!(goblin.death_saves, DeathSaves::default());
    }

    #[test]
    fn stored_current_hp_is_capped() {
        let value = serde_json::json!({
            "name": "Borin", "level": 2, "AC": 16, "max_hp": 12, "current_hp": 40
        });
        let borin: Character = serde_json::from_value(value).unwrap();
        assert_eq!(borin.current_hp, 12);
    }

    #[test]
    fn invalid_level_rejected() {
        let value = serde_json::json!({"name": "Old", "level": 25, "AC": 10, "max_hp": 5});
        assert!(serde_json::from_value::<Character>(value).is_err());
    }
}
