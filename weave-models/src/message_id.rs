// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::error::ModelsError;
use crate::prehash::PreHashed;
use serde::{Deserialize, Serialize};
use weave_hash::{Hash, HASH_SIZE_BYTES};

/// Identity of a DAG vertex (message).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct MessageId(pub Hash);

impl MessageId {
    /// ID referenced as parent by the first messages of the DAG.
    pub const NULL: MessageId = MessageId(Hash::zero());

    /// Constructs a `MessageId` from raw bytes, checking the length.
    pub fn from_bytes(data: &[u8]) -> Result<MessageId, ModelsError> {
        Ok(MessageId(Hash::from_bytes(data)?))
    }

    /// The raw 32 bytes, as persisted.
    pub fn to_bytes(&self) -> [u8; HASH_SIZE_BYTES] {
        self.0.to_bytes()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PreHashed for MessageId {}
