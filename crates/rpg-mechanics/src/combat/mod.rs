//! Attack and damage resolution, and the initiative turn order.

pub mod attack;
pub mod initiative;

pub use attack::{Advantage, AttackOutcome, AttackRoll, DamageRoll};
pub use initiative::{InitiativeEntry, InitiativeTracker, Removal, Turn};

pub use crate::character::CheckRoll;
