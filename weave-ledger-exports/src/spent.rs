// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::output::{Output, OUTPUT_ID_SIZE_BYTES};
use serde::{Deserialize, Serialize};
use weave_hash::HASH_SIZE_BYTES;
use weave_models::transaction_id::TransactionId;

/// Size of a spent-index key without its prefix byte: address plus output id.
pub const SPENT_KEY_SIZE_BYTES: usize = HASH_SIZE_BYTES + OUTPUT_ID_SIZE_BYTES;

/// A consumed transaction output together with the transaction that spent it.
///
/// Created exactly once, when the output leaves the unspent index; the
/// underlying output record stays in the ledger for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spent {
    /// The consumed output.
    pub output: Output,
    /// Transaction that consumed the output.
    pub target_transaction_id: TransactionId,
}

impl Spent {
    /// Creates a `Spent`.
    pub fn new(output: Output, target_transaction_id: TransactionId) -> Self {
        Spent {
            output,
            target_transaction_id,
        }
    }
}

impl std::fmt::Display for Spent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} spent by {}", self.output, self.target_transaction_id)
    }
}
