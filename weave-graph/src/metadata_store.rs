// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::error::GraphError;
use crate::message_metadata::{
    MessageMetadata, MessageMetadataDeserializer, MessageMetadataSerializer,
    METADATA_VALUE_SIZE_BYTES,
};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;
use weave_db_exports::{DBBatch, ShareableStore};
use weave_models::message_id::MessageId;
use weave_models::prehash::PreHashMap;
use weave_serialization::{DeserializeError, Deserializer, Serializer};

/// Store of per-message metadata records, shared by various components.
///
/// Each record is wrapped in its own read/write lock; the outer map lock is
/// only held for lookups and insertions, never across record access. The
/// durable form lives in the injected key-value store under the raw
/// 32-byte message ID.
#[derive(Clone)]
pub struct MetadataStore {
    store: ShareableStore,
    metadata: Arc<RwLock<PreHashMap<MessageId, Arc<RwLock<MessageMetadata>>>>>,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore")
            .field("cached_records", &self.metadata.read().len())
            .finish()
    }
}

impl MetadataStore {
    /// Creates a `MetadataStore` over the given backing store.
    pub fn new(store: ShareableStore) -> Self {
        MetadataStore {
            store,
            metadata: Arc::new(RwLock::new(PreHashMap::default())),
        }
    }

    /// Creates the metadata record of a message, fixing its identity and
    /// parents, and returns the shared handle.
    ///
    /// The fresh record is not persisted here: it is marked modified and
    /// written out by the next [`MetadataStore::flush`]. Creating an already
    /// known message is allowed as long as the parents are identical;
    /// diverging parents are a contract violation.
    pub fn create(
        &self,
        message_id: MessageId,
        parent1: MessageId,
        parent2: MessageId,
    ) -> Result<Arc<RwLock<MessageMetadata>>, GraphError> {
        let mut metadata = self.metadata.write();
        match metadata.entry(message_id) {
            Entry::Occupied(entry) => {
                {
                    let existing = entry.get().read();
                    if existing.parent1() != parent1 || existing.parent2() != parent2 {
                        return Err(GraphError::ImmutableMetadata(message_id));
                    }
                }
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => Ok(Arc::clone(entry.insert(Arc::new(RwLock::new(
                MessageMetadata::new(message_id, parent1, parent2),
            ))))),
        }
    }

    /// Retrieves the shared handle of a message's metadata, loading it from
    /// the backing store on a cache miss. `Ok(None)` if the message is
    /// unknown both in memory and on disk.
    pub fn retrieve(
        &self,
        message_id: &MessageId,
    ) -> Result<Option<Arc<RwLock<MessageMetadata>>>, GraphError> {
        if let Some(handle) = self.metadata.read().get(message_id) {
            return Ok(Some(Arc::clone(handle)));
        }

        let value = match self.store.get(&message_id.to_bytes())? {
            Some(value) => value,
            None => return Ok(None),
        };
        let record = decode_metadata(*message_id, &value)?;

        let mut metadata = self.metadata.write();
        let handle = metadata
            .entry(*message_id)
            .or_insert_with(|| Arc::new(RwLock::new(record)));
        Ok(Some(Arc::clone(handle)))
    }

    /// Persists the record of `message_id` if it is marked modified.
    ///
    /// Identity and parents are creation-time-only: if a record is already
    /// persisted under this key with different parent bytes, the flush is
    /// rejected with [`GraphError::ImmutableMetadata`] instead of silently
    /// overwriting it.
    pub fn flush(&self, message_id: &MessageId) -> Result<(), GraphError> {
        let handle = match self.metadata.read().get(message_id) {
            Some(handle) => Arc::clone(handle),
            None => return Err(GraphError::MissingMetadata(*message_id)),
        };

        // hold the record exclusively for the whole flush so the dirty
        // marker cannot be cleared over a concurrent mutation
        let mut record = handle.write();
        if !record.is_modified() {
            return Ok(());
        }

        let key = record.message_id().to_bytes().to_vec();
        if let Some(existing) = self.store.get(&key)? {
            let persisted = decode_metadata(record.message_id(), &existing)?;
            if persisted.parent1() != record.parent1() || persisted.parent2() != record.parent2() {
                return Err(GraphError::ImmutableMetadata(record.message_id()));
            }
        }

        let mut value = Vec::with_capacity(METADATA_VALUE_SIZE_BYTES);
        MessageMetadataSerializer::new().serialize(&*record, &mut value)?;

        let mut batch = DBBatch::new();
        batch.insert(key, Some(value));
        self.store.write_batch(batch)?;

        debug!("flushed metadata for message {}", record.message_id());
        record.set_modified(false);
        Ok(())
    }
}

fn decode_metadata(message_id: MessageId, value: &[u8]) -> Result<MessageMetadata, GraphError> {
    if value.len() != METADATA_VALUE_SIZE_BYTES {
        return Err(GraphError::DecodeError(format!(
            "metadata value for message {} has length {}, expected {}",
            message_id,
            value.len(),
            METADATA_VALUE_SIZE_BYTES
        )));
    }
    MessageMetadataDeserializer::new(message_id)
        .deserialize::<DeserializeError>(value)
        .map(|(_rest, record)| record)
        .map_err(|err| GraphError::DecodeError(err.to_string()))
}
