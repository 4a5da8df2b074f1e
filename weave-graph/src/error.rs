// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use displaydoc::Display;
use thiserror::Error;
use weave_db_exports::StoreError;
use weave_models::message_id::MessageId;
use weave_serialization::SerializeError;

/// Graph metadata error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum GraphError {
    /// metadata record for message {0} is immutable: identity and parents are fixed at creation
    ImmutableMetadata(MessageId),
    /// no metadata record for message {0}
    MissingMetadata(MessageId),
    /// metadata decode error: {0}
    DecodeError(String),
    /// metadata serialization error: {0}
    SerializeError(#[from] SerializeError),
    /// store error: {0}
    StoreError(#[from] StoreError),
}
