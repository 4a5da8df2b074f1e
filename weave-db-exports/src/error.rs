use displaydoc::Display;
use thiserror::Error;

/// Store error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// RocksDB error: {0}
    RocksDbError(String),
}
