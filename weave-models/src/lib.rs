// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Identifier and index types shared across the confirmed-state engine.

/// ledger address
pub mod address;
/// model errors
pub mod error;
/// DAG vertex identifier
pub mod message_id;
/// milestone (confirmation checkpoint) index
pub mod milestone;
/// maps and sets optimized for already-uniform keys
pub mod prehash;
/// transaction identifier
pub mod transaction_id;
