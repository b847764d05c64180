//! An in-process store.

use std::collections::HashMap;

use serde_json::Value;

use super::{RoomStore, StoreKey};
use crate::error::TableResult;

/// A store that lives in memory and never fails.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<(String, StoreKey), Value>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoomStore for MemoryStore {
    fn get(&self, room: &str, key: StoreKey) -> TableResult<Option<Value>> {
        Ok(self.values.get(&(room.to_string(), key)).cloned())
    }

    fn put(&mut self, room: &str, key: StoreKey, value: Value) -> TableResult<()> {
        self.values.insert((room.to_string(), key), value);
        Ok(())
    }

    fn remove(&mut self, room: &str, key: StoreKey) -> TableResult<()> {
        self.values.remove(&(room.to_string(), key));
        Ok(())
    }
}
