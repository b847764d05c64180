//! The game table: room-scoped operations over stored state.
//!
//! Every operation loads what it needs from the store, runs the mechanics
//! and writes the result back before returning. Characters that are not in
//! a room's roster yet are loaded from the campaign's templates on first
//! reference, leaving a notice for the players.

use rpg_mechanics::{
    Advantage, AttackRoll, Character, CharacterField, CheckRoll, DamageOutcome, DamageRoll,
    InitiativeEntry, InitiativeTracker, MechError, Removal, Roller, Turn,
};

use crate::command::title_case;
use crate::config::TableConfig;
use crate::error::TableResult;
use crate::state::{Roster, load_roster, load_tracker, save_roster, save_tracker};
use crate::store::RoomStore;
use crate::templates::TemplateSource;

/// Most numbered copies a single `!load` may create.
const MAX_COPIES: u32 = 20;

/// What happened when one character attacked another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackReport {
    /// Attacker's short name.
    pub attacker: String,
    /// Target's full name.
    pub target: String,
    /// The to-hit roll.
    pub attack: AttackRoll,
    /// The damage roll, if the attack hit.
    pub damage: Option<DamageRoll>,
}

impl AttackReport {
    /// Whether the target died.
    pub fn killed(&self) -> bool {
        self.damage
            .as_ref()
            .is_some_and(|d| d.outcome == DamageOutcome::Died)
    }
}

/// A game table serving any number of rooms.
pub struct Table<S, T, R> {
    store: S,
    templates: T,
    config: TableConfig,
    roller: R,
    notices: Vec<String>,
}

impl<S: RoomStore, T: TemplateSource, R: Roller> Table<S, T, R> {
    /// Create a table over a store, a template source and a dice roller.
    pub fn new(store: S, templates: T, config: TableConfig, roller: R) -> Self {
        Self {
            store,
            templates,
            config,
            roller,
            notices: Vec::new(),
        }
    }

    /// The table's configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Messages produced as a side effect since the last call, such as
    /// characters loaded from templates.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// All characters in a room.
    pub fn roster(&self, room: &str) -> TableResult<Roster> {
        load_roster(&self.store, room)
    }

    /// Find a character, loading it from the campaign templates if the room
    /// has not seen it yet.
    pub fn character(&mut self, room: &str, name: &str) -> TableResult<Character> {
        let mut roster = self.roster(room)?;
        if let Some(c) = lookup(&roster, name) {
            return Ok(c.clone());
        }

        let Some(template) = self.config.template_for(room, name).map(str::to_string) else {
            return Err(MechError::UnknownCharacter(name.to_string()).into());
        };
        let character = self.templates.load(&template, name)?;
        roster.insert(character.name.clone(), character.clone());
        save_roster(&mut self.store, room, &roster)?;

        tracing::debug!(room, name, %template, "loaded campaign character");
        self.notices
            .push(format!("Character {name} not in memory - loaded from config."));
        Ok(character)
    }

    /// Write a character back to its room's roster.
    pub fn save_character(&mut self, room: &str, character: &Character) -> TableResult<()> {
        let mut roster = self.roster(room)?;
        roster.insert(character.name.clone(), character.clone());
        save_roster(&mut self.store, room, &roster)
    }

    /// Load a template into the roster under `name`, or as numbered copies
    /// (`Goblin1`, `Goblin2`, ...). Returns the names loaded.
    pub fn load_template(
        &mut self,
        room: &str,
        name: Option<&str>,
        copies: u32,
        template: &str,
    ) -> TableResult<Vec<String>> {
        let base = match name {
            Some(name) => name.to_string(),
            None => title_case(
                std::path::Path::new(template)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(template),
            ),
        };
        let copies = copies.clamp(1, MAX_COPIES);
        let names: Vec<String> = if copies == 1 {
            vec![base]
        } else {
            (1..=copies).map(|i| format!("{base}{i}")).collect()
        };

        let mut roster = self.roster(room)?;
        for name in &names {
            let character = self.templates.load(template, name)?;
            roster.insert(character.name.clone(), character);
        }
        save_roster(&mut self.store, room, &roster)?;
        tracing::debug!(room, template, count = names.len(), "loaded template");
        Ok(names)
    }

    /// Take a character out of the room, and out of the initiative order.
    pub fn remove_character(&mut self, room: &str, name: &str) -> TableResult<Character> {
        let roster = self.roster(room)?;
        let character = lookup(&roster, name)
            .cloned()
            .ok_or_else(|| MechError::UnknownCharacter(name.to_string()))?;
        self.remove_everywhere(room, &character.name)?;
        Ok(character)
    }

    /// Drop a character from the roster and the turn order together.
    ///
    /// The tracker is written first; if either write fails the old tracker
    /// is put back, so neither change sticks.
    fn remove_everywhere(&mut self, room: &str, name: &str) -> TableResult<()> {
        let mut roster = self.roster(room)?;
        roster.remove(name);

        let before = self.tracker(room)?;
        let mut after = before.clone();
        let mut saved = Ok(());
        if after.contains(name) {
            after.remove_entry(name)?;
            saved = save_tracker(&mut self.store, room, &after);
        }

        let saved = saved.and_then(|()| save_roster(&mut self.store, room, &roster));
        if let Err(e) = saved {
            if after != before {
                let restored = save_tracker(&mut self.store, room, &before);
                if let Err(restore) = restored {
                    tracing::error!(room, name, %restore, "could not restore initiative order");
                }
            }
            return Err(e);
        }
        Ok(())
    }

    /// Roll a check for a character.
    pub fn check(
        &mut self,
        room: &str,
        name: &str,
        check: &str,
        passive: bool,
    ) -> TableResult<CheckRoll> {
        let character = self.character(room, name)?;
        Ok(character.check(check, passive, &mut self.roller)?)
    }

    /// Attack with a weapon. A hit rolls damage, doubled dice on a
    /// critical, and a target pushed below zero hit points dies.
    pub fn attack(
        &mut self,
        room: &str,
        attacker: &str,
        target: &str,
        weapon: &str,
        advantage: Advantage,
    ) -> TableResult<AttackReport> {
        let attacker = self.character(room, attacker)?;
        let mut target = self.character(room, target)?;

        let attack = attacker.attack(&target, weapon, advantage, &mut self.roller)?;
        let damage = if attack.is_hit() {
            let damage =
                attacker.roll_damage(&mut target, weapon, attack.is_critical(), &mut self.roller)?;
            match damage.outcome {
                DamageOutcome::Died => {
                    self.remove_everywhere(room, &target.name)?;
                    tracing::info!(room, name = %target.name, "character died");
                }
                DamageOutcome::Survived { .. } => self.save_character(room, &target)?,
            }
            Some(damage)
        } else {
            None
        };

        Ok(AttackReport {
            attacker: attacker.shortname().to_string(),
            target: target.name.clone(),
            attack,
            damage,
        })
    }

    /// Restore hit points.
    pub fn heal(&mut self, room: &str, name: &str, amount: u32) -> TableResult<Character> {
        let mut character = self.character(room, name)?;
        character.heal(amount);
        self.save_character(room, &character)?;
        Ok(character)
    }

    /// Grant experience to one character. Returns the character and the
    /// number of levels gained.
    pub fn grant_xp(&mut self, room: &str, name: &str, amount: u32) -> TableResult<(Character, u8)> {
        let mut character = self.character(room, name)?;
        let gained = character.gain_xp(amount);
        if gained > 0 {
            tracing::info!(room, name = %character.name, level = character.level, "level up");
        }
        self.save_character(room, &character)?;
        Ok((character, gained))
    }

    /// Grant experience to everyone in the room.
    pub fn grant_xp_all(&mut self, room: &str, amount: u32) -> TableResult<Vec<(Character, u8)>> {
        let mut roster = self.roster(room)?;
        let mut results = Vec::with_capacity(roster.len());
        for character in roster.values_mut() {
            let gained = character.gain_xp(amount);
            if gained > 0 {
                tracing::info!(room, name = %character.name, level = character.level, "level up");
            }
            results.push((character.clone(), gained));
        }
        save_roster(&mut self.store, room, &roster)?;
        Ok(results)
    }

    /// Overwrite one of a character's fields.
    pub fn set_field(
        &mut self,
        room: &str,
        name: &str,
        field: CharacterField,
        value: i64,
    ) -> TableResult<Character> {
        let mut character = self.character(room, name)?;
        character.set_field(field, value)?;
        self.save_character(room, &character)?;
        Ok(character)
    }

    /// Adjust one of a character's fields.
    pub fn change_field(
        &mut self,
        room: &str,
        name: &str,
        field: CharacterField,
        delta: i64,
    ) -> TableResult<Character> {
        let mut character = self.character(room, name)?;
        character.change_field(field, delta)?;
        self.save_character(room, &character)?;
        Ok(character)
    }

    /// Everyone in the room regains all hit points. Returns how many
    /// characters rested.
    pub fn long_rest(&mut self, room: &str) -> TableResult<usize> {
        let mut roster = self.roster(room)?;
        roster.values_mut().for_each(Character::rest);
        save_roster(&mut self.store, room, &roster)?;
        Ok(roster.len())
    }

    /// The room's initiative order.
    pub fn tracker(&self, room: &str) -> TableResult<InitiativeTracker> {
        load_tracker(&self.store, room)
    }

    /// Start combat with everyone on the roster.
    pub fn roll_initiative(&mut self, room: &str) -> TableResult<InitiativeTracker> {
        let roster = self.roster(room)?;
        let tracker = InitiativeTracker::roll(roster.values(), &mut self.roller);
        save_tracker(&mut self.store, room, &tracker)?;
        Ok(tracker)
    }

    /// Move to the next turn.
    pub fn advance_turn(&mut self, room: &str) -> TableResult<Turn> {
        let mut tracker = self.tracker(room)?;
        let turn = tracker.advance_turn()?;
        save_tracker(&mut self.store, room, &tracker)?;
        if turn.new_round {
            tracing::info!(room, "new round");
        }
        Ok(turn)
    }

    /// Bring a character into the fight.
    pub fn add_to_initiative(
        &mut self,
        room: &str,
        name: &str,
        value: i32,
    ) -> TableResult<InitiativeEntry> {
        let mut tracker = self.tracker(room)?;
        if !tracker.is_active() {
            return Err(MechError::NoActiveCombat.into());
        }
        let character = self.character(room, name)?;
        tracker.add_entry(character.name.clone(), value)?;
        save_tracker(&mut self.store, room, &tracker)?;
        Ok(InitiativeEntry::new(character.name, value))
    }

    /// Add a scripted event to the order.
    pub fn add_event(&mut self, room: &str, name: &str, value: i32, text: &str) -> TableResult<()> {
        let mut tracker = self.tracker(room)?;
        tracker.add_event(name, value, text)?;
        save_tracker(&mut self.store, room, &tracker)
    }

    /// Take an entry out of the order.
    pub fn remove_from_initiative(&mut self, room: &str, name: &str) -> TableResult<Removal> {
        let mut tracker = self.tracker(room)?;
        let removal = tracker.remove_entry(name)?;
        save_tracker(&mut self.store, room, &tracker)?;
        if removal.now_active.is_none() {
            tracing::info!(room, "combat over");
        }
        Ok(removal)
    }

    /// End combat.
    pub fn end_combat(&mut self, room: &str) -> TableResult<()> {
        let mut tracker = self.tracker(room)?;
        if !tracker.is_active() {
            return Err(MechError::NoActiveCombat.into());
        }
        tracker.clear();
        save_tracker(&mut self.store, room, &tracker)?;
        tracing::info!(room, "combat over");
        Ok(())
    }
}

fn lookup<'a>(roster: &'a Roster, name: &str) -> Option<&'a Character> {
    roster.get(name).or_else(|| {
        roster
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    })
}
