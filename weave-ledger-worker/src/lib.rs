// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Store-backed implementation of the confirmed UTXO ledger.
//!
//! Four sub-indices share one ordered keyspace, each behind its own prefix
//! byte: output records, the unspent marker, the spent record and the
//! per-milestone diff journal. All mutation funnels through one atomic
//! batch per confirmed milestone, behind a process-wide read/write gate.

mod ledger;
mod ledger_db;

pub use ledger::UtxoLedger;
pub use ledger_db::LedgerDB;
