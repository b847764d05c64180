//! Initiative order: who acts when, and whose turn it is right now.
//!
//! The tracker keeps its entries sorted by initiative value, highest
//! first, plus a pointer to the active entry. Presenting the order
//! starting from the active entry gives the rotation players see, so
//! inserting or removing a combatant re-sorts the whole set without
//! changing whose turn it is.
//!
//! Ties keep the order in which entries arrived: an entry added with the
//! same value as an existing one goes after it. When initiative is first
//! rolled, ties go to the higher Dexterity modifier, then roster order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::{Ability, Character};
use crate::dice::Roller;
use crate::error::{MechError, MechResult};

/// One slot in the turn order: a character or a scripted event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    /// Character name, or the event's name.
    pub name: String,
    /// Initiative value; higher acts first.
    pub value: i32,
}

impl InitiativeEntry {
    /// Create an entry.
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl std::fmt::Display for InitiativeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.value)
    }
}

/// The result of advancing to the next turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// The entry that is now active.
    pub entry: InitiativeEntry,
    /// If the entry is a scripted event, its text.
    pub event_text: Option<String>,
    /// Whether the order wrapped back to the highest initiative.
    pub new_round: bool,
}

/// The result of removing an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    /// The entry that was taken out.
    pub removed: InitiativeEntry,
    /// Whether the name only matched the entry's first word.
    pub by_first_word: bool,
    /// The entry that is active afterwards, if combat goes on.
    pub now_active: Option<InitiativeEntry>,
    /// Whether the removed entry was the active one.
    pub was_active: bool,
}

/// Turn order for one room's combat.
///
/// An empty tracker is inactive: there is no combat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitiativeTracker {
    order: Vec<InitiativeEntry>,
    active: usize,
    events: BTreeMap<String, String>,
}

impl InitiativeTracker {
    /// An inactive tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start combat: roll d20 + Dex modifier for every character.
    ///
    /// The highest roll goes first. An empty roster yields an inactive
    /// tracker.
    pub fn roll<'a>(
        roster: impl IntoIterator<Item = &'a Character>,
        roller: &mut impl Roller,
    ) -> Self {
        let mut rolled: Vec<(InitiativeEntry, i32)> = roster
            .into_iter()
            .map(|c| {
                let dex = c.modifier(Ability::Dex);
                let value = roller.d20() as i32 + dex;
                (InitiativeEntry::new(c.name.clone(), value), dex)
            })
            .collect();
        rolled.sort_by(|(a, a_dex), (b, b_dex)| {
            b.value.cmp(&a.value).then_with(|| b_dex.cmp(a_dex))
        });

        let order: Vec<InitiativeEntry> = rolled.into_iter().map(|(e, _)| e).collect();
        tracing::info!(combatants = order.len(), "initiative rolled");
        Self {
            order,
            active: 0,
            events: BTreeMap::new(),
        }
    }

    /// Rebuild a tracker from stored parts.
    ///
    /// `entries` are re-sorted by value (stably), and `active` is looked up
    /// by name, falling back to the top of the order.
    pub fn from_parts(
        mut entries: Vec<InitiativeEntry>,
        active: Option<&str>,
        events: BTreeMap<String, String>,
    ) -> Self {
        entries.sort_by(|a, b| b.value.cmp(&a.value));
        let active = active
            .and_then(|name| entries.iter().position(|e| e.name == name))
            .unwrap_or(0);
        Self {
            order: entries,
            active,
            events,
        }
    }

    /// Whether combat is underway.
    pub fn is_active(&self) -> bool {
        !self.order.is_empty()
    }

    /// Entries sorted by value, independent of whose turn it is.
    pub fn entries(&self) -> &[InitiativeEntry] {
        &self.order
    }

    /// Event texts by entry name.
    pub fn events(&self) -> &BTreeMap<String, String> {
        &self.events
    }

    /// The text for a scripted event, if `name` is one.
    pub fn event_text(&self, name: &str) -> Option<&str> {
        self.events.get(name).map(String::as_str)
    }

    /// Whether an entry with exactly this name is in the order.
    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|e| e.name == name)
    }

    /// Whose turn it is, or `None` with no combat underway.
    pub fn whose_turn(&self) -> Option<&InitiativeEntry> {
        self.order.get(self.active)
    }

    /// The order starting from the active entry, or `None` with no combat.
    pub fn report_order(&self) -> Option<Vec<&InitiativeEntry>> {
        if !self.is_active() {
            return None;
        }
        let (before, from_active) = self.order.split_at(self.active);
        Some(from_active.iter().chain(before).collect())
    }

    /// Pass the turn to the next entry in the rotation.
    pub fn advance_turn(&mut self) -> MechResult<Turn> {
        if !self.is_active() {
            return Err(MechError::NoActiveCombat);
        }
        self.active = (self.active + 1) % self.order.len();
        let entry = self.order[self.active].clone();
        let event_text = self.events.get(&entry.name).cloned();
        Ok(Turn {
            entry,
            event_text,
            new_round: self.active == 0,
        })
    }

    /// Add a combatant mid-fight, or change an existing entry's value.
    ///
    /// Whoever was active stays active.
    pub fn add_entry(&mut self, name: impl Into<String>, value: i32) -> MechResult<()> {
        if !self.is_active() {
            return Err(MechError::NoActiveCombat);
        }
        let name = name.into();
        let active_name = self.order[self.active].name.clone();

        self.order.retain(|e| e.name != name);
        let at = self
            .order
            .iter()
            .position(|e| e.value < value)
            .unwrap_or(self.order.len());
        self.order.insert(at, InitiativeEntry::new(name, value));

        self.active = self
            .order
            .iter()
            .position(|e| e.name == active_name)
            .unwrap_or(0);
        Ok(())
    }

    /// Add a scripted event whose text is delivered when its turn comes up.
    ///
    /// Events stay in the rotation and fire every round until removed.
    pub fn add_event(
        &mut self,
        name: impl Into<String>,
        value: i32,
        text: impl Into<String>,
    ) -> MechResult<()> {
        let name = name.into();
        self.add_entry(name.clone(), value)?;
        self.events.insert(name, text.into());
        Ok(())
    }

    /// Take an entry out of the order.
    ///
    /// The name is matched exactly first, then ignoring case, then against
    /// each entry's first word. Removing the active entry passes the turn to the next one;
    /// removing the last entry ends combat.
    pub fn remove_entry(&mut self, name: &str) -> MechResult<Removal> {
        if !self.is_active() {
            return Err(MechError::NoActiveCombat);
        }
        let (index, by_first_word) = self
            .locate(name)
            .ok_or_else(|| MechError::UnknownCharacter(name.to_string()))?;
        if by_first_word {
            tracing::warn!(
                requested = name,
                matched = %self.order[index].name,
                "initiative entry matched by first word"
            );
        }

        let was_active = index == self.active;
        let removed = self.order.remove(index);
        self.events.remove(&removed.name);

        if self.order.is_empty() {
            self.clear();
        } else if index < self.active {
            self.active -= 1;
        } else if self.active >= self.order.len() {
            self.active = 0;
        }

        Ok(Removal {
            removed,
            by_first_word,
            now_active: self.whose_turn().cloned(),
            was_active,
        })
    }

    /// End combat.
    pub fn clear(&mut self) {
        self.order.clear();
        self.events.clear();
        self.active = 0;
    }

    fn locate(&self, name: &str) -> Option<(usize, bool)> {
        let whole = self
            .order
            .iter()
            .position(|e| e.name == name)
            .or_else(|| {
                self.order
                    .iter()
                    .position(|e| e.name.eq_ignore_ascii_case(name))
            });
        if let Some(i) = whole {
            return Some((i, false));
        }
        self.order
            .iter()
            .position(|e| {
                e.name
                    .split_whitespace()
                    .next()
                    .is_some_and(|w| w.eq_ignore_ascii_case(name))
            })
            .map(|i| (i, true))
    }
}
