//! The closed set of character fields a game master may edit by name.

use super::{Ability, Character, MAX_LEVEL};
use crate::error::{MechError, MechResult};

/// An editable numeric field on a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterField {
    /// Level, 1 to 20.
    Level,
    /// Experience points. Setting XP does not level the character.
    Xp,
    /// Armor class.
    ArmorClass,
    /// Maximum hit points. Lowering it also lowers current hit points.
    MaxHp,
    /// Current hit points, 0 to max.
    CurrentHp,
    /// One ability score, 1 to 30.
    Ability(Ability),
}

impl CharacterField {
    /// Parse a field name as typed in chat, ignoring case.
    pub fn parse(s: &str) -> MechResult<Self> {
        if let Some(ability) = Ability::parse(s) {
            return Ok(Self::Ability(ability));
        }
        match s.trim().to_lowercase().as_str() {
            "level" => Ok(Self::Level),
            "xp" | "experience" => Ok(Self::Xp),
            "ac" | "armor_class" | "armour_class" => Ok(Self::ArmorClass),
            "max_hp" | "maxhp" => Ok(Self::MaxHp),
            "current_hp" | "hp" | "currenthp" => Ok(Self::CurrentHp),
            _ => Err(MechError::UnknownField(s.to_string())),
        }
    }

    /// The field's canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Xp => "XP",
            Self::ArmorClass => "AC",
            Self::MaxHp => "max_hp",
            Self::CurrentHp => "current_hp",
            Self::Ability(a) => a.abbrev(),
        }
    }
}

impl std::fmt::Display for CharacterField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Character {
    /// Read a field's current value.
    pub fn field(&self, field: CharacterField) -> i64 {
        match field {
            CharacterField::Level => self.level.into(),
            CharacterField::Xp => self.xp.into(),
            CharacterField::ArmorClass => self.armor_class.into(),
            CharacterField::MaxHp => self.max_hp.into(),
            CharacterField::CurrentHp => self.current_hp.into(),
            CharacterField::Ability(a) => self.abilities.score(a).into(),
        }
    }

    /// Overwrite a field, rejecting values outside its range.
    pub fn set_field(&mut self, field: CharacterField, value: i64) -> MechResult<()> {
        let invalid = || MechError::InvalidFieldValue {
            field: field.name().to_string(),
            value,
        };
        match field {
            CharacterField::Level => {
                let level = u8::try_from(value)
                    .ok()
                    .filter(|l| (1..=MAX_LEVEL).contains(l))
                    .ok_or_else(invalid)?;
                self.level = level;
            }
            CharacterField::Xp => {
                self.xp = u32::try_from(value).map_err(|_| invalid())?;
            }
            CharacterField::ArmorClass => {
                self.armor_class = i32::try_from(value)
                    .ok()
                    .filter(|ac| *ac >= 0)
                    .ok_or_else(invalid)?;
            }
            CharacterField::MaxHp => {
                let max_hp = i32::try_from(value)
                    .ok()
                    .filter(|hp| *hp >= 1)
                    .ok_or_else(invalid)?;
                self.max_hp = max_hp;
                self.current_hp = self.current_hp.min(max_hp);
            }
            CharacterField::CurrentHp => {
                self.current_hp = i32::try_from(value)
                    .ok()
                    .filter(|hp| (0..=self.max_hp).contains(hp))
                    .ok_or_else(invalid)?;
            }
            CharacterField::Ability(a) => {
                *self.abilities.score_mut(a) = i32::try_from(value)
                    .ok()
                    .filter(|s| (1..=30).contains(s))
                    .ok_or_else(invalid)?;
            }
        }
        Ok(())
    }

    /// Add `delta` to a field. Returns the new value.
    pub fn change_field(&mut self, field: CharacterField, delta: i64) -> MechResult<i64> {
        let value = self.field(field).saturating_add(delta);
        self.set_field(field, value)?;
        Ok(value)
    }
}
