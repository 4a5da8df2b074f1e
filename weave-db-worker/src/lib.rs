// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! RocksDB-backed implementation of the `weave_db_exports` store contract.
//!
//! RocksDB stores keys and values as arbitrarily-sized byte streams and
//! supports both point lookups and range scans, which is exactly the shape
//! of the contract: the confirmed-state engine keeps all its indices in one
//! ordered namespace and distinguishes them by key prefix.

mod weave_db;

pub use crate::weave_db::*;
