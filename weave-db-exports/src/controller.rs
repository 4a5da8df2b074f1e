use std::fmt::Debug;
use std::sync::Arc;

use crate::{DBBatch, StoreError};

/// Raw store key bytes
pub type Key = Vec<u8>;
/// Raw store value bytes
pub type Value = Vec<u8>;

/// Contract of the underlying ordered key-value store.
pub trait StoreController: Send + Sync + Debug {
    /// Point lookup of a single key.
    fn get(&self, key: &[u8]) -> Result<Option<Value>, StoreError>;

    /// Iterates all entries whose key starts with `prefix`, in ascending key
    /// order. Early termination is dropping the iterator. Storage faults are
    /// surfaced as `Err` items and must not be swallowed by callers.
    fn prefix_iterator<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Key, Value), StoreError>> + 'a>;

    /// Atomically applies a staged batch: either every staged set and delete
    /// becomes visible, or none does.
    fn write_batch(&self, batch: DBBatch) -> Result<(), StoreError>;
}

/// Shared handle to a store implementation
pub type ShareableStore = Arc<dyn StoreController>;
