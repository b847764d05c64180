//! Tabletop RPG mechanics for the rpgchar chat assistant.
//!
//! Provides d20 dice rolling with an injectable random source, the
//! character model (ability and skill checks, attacks, damage, healing,
//! experience), and the initiative tracker that keeps turn order stable
//! while combatants and scripted events come and go mid-fight.
//!
//! Nothing in this crate performs I/O; persistence and chat handling live
//! in `rpg-table`.

pub mod character;
pub mod combat;
pub mod dice;
pub mod error;

pub use character::{
    Abilities, Ability, Character, CharacterField, DamageOutcome, DeathSaves, HealthBand, Skill,
    Weapon,
};
pub use combat::{
    Advantage, AttackOutcome, AttackRoll, CheckRoll, DamageRoll, InitiativeEntry,
    InitiativeTracker, Removal, Turn,
};
pub use dice::{DiceSpec, Die, DieResult, RollResult, Roller, ScriptedRolls};
pub use error::{MechError, MechResult};
