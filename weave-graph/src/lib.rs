// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Per-vertex metadata of the DAG: solidity, confirmation and conflict
//! status, ancestry references and cone-root indices, persisted as a fixed
//! 85-byte record keyed by message ID.
//!
//! Every record carries its own read/write lock; no operation ever needs to
//! observe two records atomically together, so there is no store-wide lock
//! on this tier.

mod error;
mod message_metadata;
mod metadata_store;

pub use error::GraphError;
pub use message_metadata::{
    MessageMetadata, MessageMetadataDeserializer, MessageMetadataSerializer,
    METADATA_VALUE_SIZE_BYTES,
};
pub use metadata_store::MetadataStore;
