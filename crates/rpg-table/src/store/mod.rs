//! The room-scoped key-value store the host provides.
//!
//! Values are opaque JSON. The table decides what goes under each key; a
//! store only has to hand back what it was given.

pub mod file;
pub mod memory;
pub mod retry;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use retry::RetryingStore;

use serde_json::Value;

use crate::error::TableResult;

/// The keys the table stores under in each room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreKey {
    /// The roster: character name to character sheet.
    Chars,
    /// The initiative order: entry name to value, highest first.
    Initiatives,
    /// Name of the entry whose turn it is.
    ActivePlayer,
    /// Scripted event texts by entry name.
    Events,
}

impl StoreKey {
    /// All keys, in storage order.
    pub const ALL: [StoreKey; 4] = [
        Self::Chars,
        Self::Initiatives,
        Self::ActivePlayer,
        Self::Events,
    ];

    /// The key as stored.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chars => "chars",
            Self::Initiatives => "initiatives",
            Self::ActivePlayer => "active_player",
            Self::Events => "events",
        }
    }

    /// Look a stored key name back up.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

impl std::fmt::Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key-value store partitioned by room.
///
/// Failures to reach the backing storage are reported as
/// [`TableError::StoreUnavailable`](crate::TableError::StoreUnavailable),
/// which [`RetryingStore`] retries.
pub trait RoomStore {
    /// Read a value, or `None` if nothing is stored.
    fn get(&self, room: &str, key: StoreKey) -> TableResult<Option<Value>>;

    /// Store a value, replacing any previous one.
    fn put(&mut self, room: &str, key: StoreKey, value: Value) -> TableResult<()>;

    /// Forget a value. Removing an absent key is not an error.
    fn remove(&mut self, room: &str, key: StoreKey) -> TableResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_round_trip() {
        for key in StoreKey::ALL {
            assert_eq!(StoreKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(StoreKey::Chars.to_string(), "chars");
        assert_eq!(StoreKey::parse("scenes"), None);
    }
}
