// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::error::ModelsError;
use crate::prehash::PreHashed;
use serde::{Deserialize, Serialize};
use weave_hash::{Hash, HASH_SIZE_BYTES};

/// Identity of a value transaction carried by a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransactionId(pub Hash);

impl TransactionId {
    /// Constructs a `TransactionId` from raw bytes, checking the length.
    pub fn from_bytes(data: &[u8]) -> Result<TransactionId, ModelsError> {
        Ok(TransactionId(Hash::from_bytes(data)?))
    }

    /// The raw 32 bytes, as persisted.
    pub fn to_bytes(&self) -> [u8; HASH_SIZE_BYTES] {
        self.0.to_bytes()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PreHashed for TransactionId {}
