use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;

/// A memoising table with a compute-on-miss contract.
///
/// Entries are monotonic: once stored they never change, so exposing
/// the table to a single-threaded consumer needs no coordination
/// beyond the interior `RefCell`.
#[derive(Debug, Default)]
pub struct Cache<K, V> {
    entries: RefCell<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Return the cached value for the key, or compute and store it.
    ///
    /// The computation runs outside of any borrow of the table, so it
    /// may recursively consult the cache under other keys. Failed
    /// computations are not stored.
    pub fn get_or_update<E>(&self, key: K, compute: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(value) = self.entries.borrow().get(&key) {
            return Ok(value.clone());
        }
        let value = compute()?;
        self.entries.borrow_mut().insert(key, value.clone());
        Ok(value)
    }
}
