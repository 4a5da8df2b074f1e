// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::output::OutputId;
use displaydoc::Display;
use thiserror::Error;
use weave_db_exports::StoreError;
use weave_serialization::SerializeError;

/// Ledger error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum LedgerError {
    /// output {0} not found in the ledger
    OutputNotFound(OutputId),
    /// ledger decode error: {0}
    DecodeError(String),
    /// ledger serialization error: {0}
    SerializeError(#[from] SerializeError),
    /// store error: {0}
    StoreError(#[from] StoreError),
}
