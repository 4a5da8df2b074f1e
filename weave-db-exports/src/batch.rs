use std::collections::BTreeMap;

use crate::{Key, Value};

/// Batch of store mutations, staged in memory and applied atomically by
/// `StoreController::write_batch`.
///
/// `Some(value)` stages a set, `None` stages a delete. Dropping the batch
/// before it is written cancels every staged operation.
pub type DBBatch = BTreeMap<Key, Option<Value>>;
