//! Bounded retries around an unreliable store.

use serde_json::Value;

use super::{RoomStore, StoreKey};
use crate::error::{TableError, TableResult};

/// Retries [`TableError::StoreUnavailable`] up to a fixed number of
/// attempts. Every other error is returned straight away.
#[derive(Debug, Clone)]
pub struct RetryingStore<S> {
    inner: S,
    attempts: u32,
}

impl<S: RoomStore> RetryingStore<S> {
    /// Wrap `inner`, trying each operation at most `attempts` times
    /// (at least once).
    pub fn new(inner: S, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
        }
    }

    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the store.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn retry<T>(
        attempts: u32,
        op: &str,
        room: &str,
        key: StoreKey,
        mut f: impl FnMut() -> TableResult<T>,
    ) -> TableResult<T> {
        let mut attempt = 1;
        loop {
            match f() {
                Err(TableError::StoreUnavailable(reason)) if attempt < attempts => {
                    tracing::warn!(op, room, %key, attempt, %reason, "store unavailable, retrying");
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl<S: RoomStore> RoomStore for RetryingStore<S> {
    fn get(&self, room: &str, key: StoreKey) -> TableResult<Option<Value>> {
        Self::retry(self.attempts, "get", room, key, || self.inner.get(room, key))
    }

    fn put(&mut self, room: &str, key: StoreKey, value: Value) -> TableResult<()> {
        let inner = &mut self.inner;
        Self::retry(self.attempts, "put", room, key, || {
            inner.put(room, key, value.clone())
        })
    }

    fn remove(&mut self, room: &str, key: StoreKey) -> TableResult<()> {
        let inner = &mut self.inner;
        Self::retry(self.attempts, "remove", room, key, || inner.remove(room, key))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    /// Fails the first `failures` calls of any kind.
    struct Flaky {
        inner: MemoryStore,
        failures: Cell<u32>,
        calls: Cell<u32>,
    }

    impl Flaky {
        fn new(failures: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                failures: Cell::new(failures),
                calls: Cell::new(0),
            }
        }

        fn trip(&self) -> TableResult<()> {
            self.calls.set(self.calls.get() + 1);
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err(TableError::StoreUnavailable("connection reset".to_string()));
            }
            Ok(())
        }
    }

    impl RoomStore for Flaky {
        fn get(&self, room: &str, key: StoreKey) -> TableResult<Option<Value>> {
            self.trip()?;
            self.inner.get(room, key)
        }

        fn put(&mut self, room: &str, key: StoreKey, value: Value) -> TableResult<()> {
            self.trip()?;
            self.inner.put(room, key, value)
        }

        fn remove(&mut self, room: &str, key: StoreKey) -> TableResult<()> {
            self.trip()?;
            self.inner.remove(room, key)
        }
    }

    #[test]
    fn recovers_within_budget() {
        let mut store = RetryingStore::new(Flaky::new(2), 3);
        store.put("tavern", StoreKey::ActivePlayer, json!("Aria")).unwrap();
        assert_eq!(store.inner().calls.get(), 3);
        assert_eq!(
            store.get("tavern", StoreKey::ActivePlayer).unwrap(),
            Some(json!("Aria"))
        );
    }

    #[test]
    fn gives_up_after_budget() {
        let store = RetryingStore::new(Flaky::new(5), 3);
        assert!(matches!(
            store.get("tavern", StoreKey::Chars),
            Err(TableError::StoreUnavailable(_))
        ));
        assert_eq!(store.inner().calls.get(), 3);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let store = RetryingStore::new(Flaky::new(0), 0);
        assert_eq!(store.get("tavern", StoreKey::Chars).unwrap(), None);
        assert_eq!(store.into_inner().calls.get(), 1);
    }
}
