// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Shared types and the controller trait of the confirmed UTXO ledger.
//!
//! The concrete store-backed implementation lives in `weave_ledger_worker`;
//! collaborators depend on this crate only.

mod controller;
mod error;
mod milestone_diff;
mod output;
mod spent;

pub use controller::LedgerController;
pub use error::LedgerError;
pub use milestone_diff::{MilestoneDiff, MilestoneDiffDeserializer, MilestoneDiffSerializer};
pub use output::{
    Output, OutputDeserializer, OutputId, OutputIdDeserializer, OutputIdSerializer,
    OutputSerializer, OUTPUT_ID_SIZE_BYTES, OUTPUT_VALUE_SIZE_BYTES,
};
pub use spent::{Spent, SPENT_KEY_SIZE_BYTES};
