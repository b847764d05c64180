//! Reading and writing a room's roster and initiative order.

use std::collections::BTreeMap;

use rpg_mechanics::{Character, InitiativeEntry, InitiativeTracker};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{TableError, TableResult};
use crate::store::{RoomStore, StoreKey};

/// A room's characters by name.
pub type Roster = BTreeMap<String, Character>;

fn decode<T: DeserializeOwned>(room: &str, key: StoreKey, value: Value) -> TableResult<T> {
    serde_json::from_value(value).map_err(|e| TableError::CorruptState {
        room: room.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: serde::Serialize>(room: &str, key: StoreKey, value: &T) -> TableResult<Value> {
    serde_json::to_value(value).map_err(|e| TableError::CorruptState {
        room: room.to_string(),
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// Load the roster. A room with no roster has no characters.
pub fn load_roster(store: &impl RoomStore, room: &str) -> TableResult<Roster> {
    match store.get(room, StoreKey::Chars)? {
        Some(value) => decode(room, StoreKey::Chars, value),
        None => Ok(Roster::new()),
    }
}

/// Replace the stored roster.
pub fn save_roster(store: &mut impl RoomStore, room: &str, roster: &Roster) -> TableResult<()> {
    let value = encode(room, StoreKey::Chars, roster)?;
    store.put(room, StoreKey::Chars, value)
}

/// Load the initiative order. Nothing stored means no combat.
pub fn load_tracker(store: &impl RoomStore, room: &str) -> TableResult<InitiativeTracker> {
    let Some(order) = store.get(room, StoreKey::Initiatives)? else {
        return Ok(InitiativeTracker::new());
    };
    let order: Map<String, Value> = decode(room, StoreKey::Initiatives, order)?;
    let entries = order
        .into_iter()
        .map(|(name, value)| {
            value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(|v| InitiativeEntry::new(name.clone(), v))
                .ok_or_else(|| TableError::CorruptState {
                    room: room.to_string(),
                    key: StoreKey::Initiatives.to_string(),
                    reason: format!("{name} has initiative {value}"),
                })
        })
        .collect::<TableResult<Vec<_>>>()?;

    let active: Option<String> = match store.get(room, StoreKey::ActivePlayer)? {
        Some(value) => decode(room, StoreKey::ActivePlayer, value)?,
        None => None,
    };
    let events: BTreeMap<String, String> = match store.get(room, StoreKey::Events)? {
        Some(value) => decode(room, StoreKey::Events, value)?,
        None => BTreeMap::new(),
    };

    Ok(InitiativeTracker::from_parts(
        entries,
        active.as_deref(),
        events,
    ))
}

/// Store the initiative order, or clear it if combat is over.
pub fn save_tracker(
    store: &mut impl RoomStore,
    room: &str,
    tracker: &InitiativeTracker,
) -> TableResult<()> {
    let Some(active) = tracker.whose_turn() else {
        for key in [StoreKey::Initiatives, StoreKey::ActivePlayer, StoreKey::Events] {
            store.remove(room, key)?;
        }
        return Ok(());
    };

    let order: Map<String, Value> = tracker
        .entries()
        .iter()
        .map(|e| (e.name.clone(), Value::from(e.value)))
        .collect();
    store.put(room, StoreKey::Initiatives, Value::Object(order))?;
    store.put(room, StoreKey::ActivePlayer, Value::from(active.name.as_str()))?;
    let events = encode(room, StoreKey::Events, tracker.events())?;
    store.put(room, StoreKey::Events, events)
}
