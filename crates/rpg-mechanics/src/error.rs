//! Error types for the mechanics engine.

/// Errors that can occur during mechanics operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A character name is absent from the roster and no template resolves it.
    #[error("unknown character: {0}")]
    UnknownCharacter(String),

    /// A skill or ability name does not map to any of the six abilities.
    #[error("unknown skill or ability: {0}")]
    UnknownSkillOrAbility(String),

    /// A character does not carry the named weapon or spell.
    #[error("{character} has no weapon called '{weapon}'")]
    UnknownWeapon {
        /// The attacking character.
        character: String,
        /// The weapon that was asked for.
        weapon: String,
    },

    /// A character field name is not one of the editable fields.
    #[error("unknown character field: {0}")]
    UnknownField(String),

    /// A field was set to a value outside its allowed range.
    #[error("invalid value {value} for {field}")]
    InvalidFieldValue {
        /// The field being edited.
        field: String,
        /// The rejected value.
        value: i64,
    },

    /// An initiative operation was attempted with no combat underway.
    #[error("no active combat")]
    NoActiveCombat,

    /// A weapon's damage string does not parse as `[count]dN`.
    #[error("malformed damage spec: '{0}'")]
    MalformedDamageSpec(String),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
