use bytes::Bytes;
use glob_match::glob_match;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Key = String;

/// The Store holds every key-value pair the server knows about.
///
/// A single reader/writer lock guards the whole map: reads share it, mutations hold it
/// exclusively, and every method acquires it for exactly one map operation. Sequences of calls are
/// therefore not atomic, a writer may slip in between two calls made by the same command. The store
/// is cheap to clone, clones share the same underlying map.
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<HashMap<Key, Bytes>>>,
}

impl Store {
    pub fn new() -> Store {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        self.read().get(key).cloned()
    }

    pub fn set(&self, key: Key, value: Bytes) {
        self.write().insert(key, value);
    }

    /// Removes `key`, returning whether it was present.
    pub fn delete(&self, key: &str) -> bool {
        self.write().remove(key).is_some()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn size(&self) -> usize {
        self.read().len()
    }

    /// Returns every key matching the glob `pattern`, in map iteration order.
    ///
    /// `*` and `?` do not match `/`, use `**` to match across it.
    pub fn keys_matching(&self, pattern: &str) -> Vec<Key> {
        self.read()
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect()
    }

    // A panic while holding the lock can't leave the map half-updated, every critical section is a
    // single `HashMap` call.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Key, Bytes>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Key, Bytes>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
