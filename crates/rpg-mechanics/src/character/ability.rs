//! The six ability scores and the skills that hang off them.

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// Modifier for an ability score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// One of the six abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Ability {
    /// Strength.
    #[serde(alias = "str", alias = "strength")]
    Str,
    /// Dexterity.
    #[serde(alias = "dex", alias = "dexterity")]
    Dex,
    /// Constitution.
    #[serde(alias = "con", alias = "constitution")]
    Con,
    /// Intelligence.
    #[serde(alias = "int", alias = "intelligence")]
    Int,
    /// Wisdom.
    #[serde(alias = "wis", alias = "wisdom")]
    Wis,
    /// Charisma.
    #[serde(alias = "cha", alias = "charisma")]
    Cha,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Self::Str,
        Self::Dex,
        Self::Con,
        Self::Int,
        Self::Wis,
        Self::Cha,
    ];

    /// Parse an abbreviation or full name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "str" | "strength" => Some(Self::Str),
            "dex" | "dexterity" => Some(Self::Dex),
            "con" | "constitution" => Some(Self::Con),
            "int" | "intelligence" => Some(Self::Int),
            "wis" | "wisdom" => Some(Self::Wis),
            "cha" | "charisma" => Some(Self::Cha),
            _ => None,
        }
    }

    /// The three-letter abbreviation.
    pub fn abbrev(self) -> &'static str {
        match self {
            Self::Str => "Str",
            Self::Dex => "Dex",
            Self::Con => "Con",
            Self::Int => "Int",
            Self::Wis => "Wis",
            Self::Cha => "Cha",
        }
    }
}

impl std::fmt::Display for Ability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.abbrev())
    }
}

/// A character's six ability scores. Missing scores default to 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Abilities {
    /// Strength score.
    #[serde(rename = "Str")]
    pub strength: i32,
    /// Dexterity score.
    #[serde(rename = "Dex")]
    pub dexterity: i32,
    /// Constitution score.
    #[serde(rename = "Con")]
    pub constitution: i32,
    /// Intelligence score.
    #[serde(rename = "Int")]
    pub intelligence: i32,
    /// Wisdom score.
    #[serde(rename = "Wis")]
    pub wisdom: i32,
    /// Charisma score.
    #[serde(rename = "Cha")]
    pub charisma: i32,
}

impl Default for Abilities {
    fn default() -> Self {
        Self::uniform(10)
    }
}

impl Abilities {
    /// Every ability at the same score.
    pub fn uniform(score: i32) -> Self {
        Self {
            strength: score,
            dexterity: score,
            constitution: score,
            intelligence: score,
            wisdom: score,
            charisma: score,
        }
    }

    /// The score for one ability.
    pub fn score(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    /// Mutable access to one ability's score.
    pub fn score_mut(&mut self, ability: Ability) -> &mut i32 {
        match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        }
    }

    /// Set one ability's score, builder style.
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        *self.score_mut(ability) = score;
        self
    }

    /// The modifier for one ability.
    pub fn modifier(&self, ability: Ability) -> i32 {
        ability_modifier(self.score(ability))
    }
}

/// A skill, each governed by a single ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    /// Athletics (Str).
    Athletics,
    /// Acrobatics (Dex).
    Acrobatics,
    /// Sleight of Hand (Dex).
    SleightOfHand,
    /// Stealth (Dex).
    Stealth,
    /// Arcana (Int).
    Arcana,
    /// History (Int).
    History,
    /// Investigation (Int).
    Investigation,
    /// Nature (Int).
    Nature,
    /// Religion (Int).
    Religion,
    /// Animal Handling (Wis).
    AnimalHandling,
    /// Insight (Wis).
    Insight,
    /// Medicine (Wis).
    Medicine,
    /// Perception (Wis).
    Perception,
    /// Survival (Wis).
    Survival,
    /// Deception (Cha).
    Deception,
    /// Intimidation (Cha).
    Intimidation,
    /// Performance (Cha).
    Performance,
    /// Persuasion (Cha).
    Persuasion,
}

impl Skill {
    /// Parse a skill name, ignoring case. Spaces, hyphens and underscores
    /// between words are interchangeable.
    pub fn parse(s: &str) -> Option<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        match key.as_str() {
            "athletics" => Some(Self::Athletics),
            "acrobatics" => Some(Self::Acrobatics),
            "sleight of hand" => Some(Self::SleightOfHand),
            "stealth" => Some(Self::Stealth),
            "arcana" => Some(Self::Arcana),
            "history" => Some(Self::History),
            "investigation" => Some(Self::Investigation),
            "nature" => Some(Self::Nature),
            "religion" => Some(Self::Religion),
            "animal handling" => Some(Self::AnimalHandling),
            "insight" => Some(Self::Insight),
            "medicine" => Some(Self::Medicine),
            "perception" => Some(Self::Perception),
            "survival" => Some(Self::Survival),
            "deception" => Some(Self::Deception),
            "intimidation" => Some(Self::Intimidation),
            "performance" => Some(Self::Performance),
            "persuasion" => Some(Self::Persuasion),
            _ => None,
        }
    }

    /// Like [`Skill::parse`], but an unknown name is an error.
    pub fn resolve(s: &str) -> MechResult<Self> {
        Self::parse(s).ok_or_else(|| MechError::UnknownSkillOrAbility(s.to_string()))
    }

    /// The ability this skill is checked against.
    pub fn ability(self) -> Ability {
        match self {
            Self::Athletics => Ability::Str,
            Self::Acrobatics | Self::SleightOfHand | Self::Stealth => Ability::Dex,
            Self::Arcana | Self::History | Self::Investigation | Self::Nature | Self::Religion => {
                Ability::Int
            }
            Self::AnimalHandling
            | Self::Insight
            | Self::Medicine
            | Self::Perception
            | Self::Survival => Ability::Wis,
            Self::Deception | Self::Intimidation | Self::Performance | Self::Persuasion => {
                Ability::Cha
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn modifier_examples() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(1), -5);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(15), 2);
    }

    proptest! {
        #[test]
        fn modifier_is_floored_half(score in -30i32..60) {
            let expected = ((score - 10) as f64 / 2.0).floor() as i32;
            prop_assert_eq!(ability_modifier(score), expected);
        }
    }

    #[test]
    fn ability_parse() {
        assert_eq!(Ability::parse("Dex"), Some(Ability::Dex));
        assert_eq!(Ability::parse("STRENGTH"), Some(Ability::Str));
        assert_eq!(Ability::parse("luck"), None);
    }

    #[test]
    fn skill_table() {
        assert_eq!(Skill::Athletics.ability(), Ability::Str);
        assert_eq!(Skill::Stealth.ability(), Ability::Dex);
        assert_eq!(Skill::Religion.ability(), Ability::Int);
        assert_eq!(Skill::AnimalHandling.ability(), Ability::Wis);
        assert_eq!(Skill::Persuasion.ability(), Ability::Cha);
    }

    #[test]
    fn skill_parse_variants() {
        assert_eq!(Skill::parse("Sleight of Hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::parse("sleight-of-hand"), Some(Skill::SleightOfHand));
        assert_eq!(Skill::parse("animal_handling"), Some(Skill::AnimalHandling));
        assert_eq!(Skill::parse("PERCEPTION"), Some(Skill::Perception));
    }

    #[test]
    fn unknown_skill_is_an_error() {
        assert_eq!(
            Skill::resolve("juggling"),
            Err(MechError::UnknownSkillOrAbility("juggling".to_string()))
        );
    }

    #[test]
    fn abilities_serialize_with_short_keys() {
        let abilities = Abilities::default().with(Ability::Dex, 14);
        let value = serde_json::to_value(abilities).unwrap();
        assert_eq!(value["Dex"], 14);
        assert_eq!(value["Str"], 10);
        assert_eq!(abilities.modifier(Ability::Dex), 2);
    }
}
