//! A store backed by a single JSON file.
//!
//! The file holds one object per room, each mapping store keys to values:
//!
//! ```json
//! { "tavern": { "chars": { ... }, "active_player": "Aria" } }
//! ```
//!
//! The whole file is rewritten on every change.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::{RoomStore, StoreKey};
use crate::error::{TableError, TableResult};

/// A store persisted to a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    rooms: Map<String, Value>,
}

impl JsonFileStore {
    /// Open a store file. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> TableResult<Self> {
        let path = path.into();
        let rooms = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Map::new(),
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(rooms)) => rooms,
                Ok(_) => {
                    return Err(corrupt(&path, "top level is not an object"));
                }
                Err(e) => return Err(corrupt(&path, &e.to_string())),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(TableError::StoreUnavailable(e.to_string())),
        };
        tracing::debug!(path = %path.display(), rooms = rooms.len(), "opened store");
        Ok(Self { path, rooms })
    }

    /// The file this store writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `rooms` to disk, then adopt them. On failure the store keeps
    /// its previous contents.
    fn commit(&mut self, rooms: Map<String, Value>) -> TableResult<()> {
        write(&self.path, &rooms)?;
        self.rooms = rooms;
        Ok(())
    }
}

fn write(path: &Path, rooms: &Map<String, Value>) -> TableResult<()> {
    let text = serde_json::to_string_pretty(rooms)
        .map_err(|e| TableError::StoreUnavailable(e.to_string()))?;
    std::fs::write(path, text).map_err(|e| TableError::StoreUnavailable(e.to_string()))
}

fn corrupt(path: &Path, reason: &str) -> TableError {
    TableError::CorruptState {
        room: "*".to_string(),
        key: path.display().to_string(),
        reason: reason.to_string(),
    }
}

impl RoomStore for JsonFileStore {
    fn get(&self, room: &str, key: StoreKey) -> TableResult<Option<Value>> {
        let value = self
            .rooms
            .get(room)
            .and_then(|r| r.get(key.as_str()))
            .cloned();
        tracing::debug!(room, %key, found = value.is_some(), "store read");
        Ok(value)
    }

    fn put(&mut self, room: &str, key: StoreKey, value: Value) -> TableResult<()> {
        let mut rooms = self.rooms.clone();
        let entry = rooms
            .entry(room.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(values) = entry {
            values.insert(key.as_str().to_string(), value);
        }
        tracing::debug!(room, %key, "store write");
        self.commit(rooms)
    }

    fn remove(&mut self, room: &str, key: StoreKey) -> TableResult<()> {
        let mut rooms = self.rooms.clone();
        let removed = rooms
            .get_mut(room)
            .and_then(Value::as_object_mut)
            .and_then(|values| values.remove(key.as_str()));
        if removed.is_none() {
            return Ok(());
        }
        tracing::debug!(room, %key, "store remove");
        self.commit(rooms)
    }
}
