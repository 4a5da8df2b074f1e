// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use tracing::{debug, warn};
use weave_db_exports::{DBBatch, ShareableStore};
use weave_hash::HASH_SIZE_BYTES;
use weave_ledger_exports::{
    LedgerError, MilestoneDiff, MilestoneDiffDeserializer, MilestoneDiffSerializer, Output,
    OutputDeserializer, OutputId, OutputIdDeserializer, OutputSerializer, Spent,
    OUTPUT_ID_SIZE_BYTES, OUTPUT_VALUE_SIZE_BYTES,
};
use weave_models::address::Address;
use weave_models::milestone::MilestoneIndex;
use weave_models::transaction_id::TransactionId;
use weave_serialization::{DeserializeError, Deserializer, Serializer};

/// Prefix byte of output records: key `O ++ transaction_id ++ output_index`.
const OUTPUT_PREFIX: u8 = b'O';
/// Prefix byte of unspent markers: key `U ++ address ++ output_id`, empty value.
const UNSPENT_PREFIX: u8 = b'U';
/// Prefix byte of spent records: key `S ++ address ++ output_id`, value is
/// the consuming transaction id.
const SPENT_PREFIX: u8 = b'S';
/// Prefix byte of milestone diff journal entries: key `D ++ index`.
const DIFF_PREFIX: u8 = b'D';

fn output_key(output_id: &OutputId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + OUTPUT_ID_SIZE_BYTES);
    key.push(OUTPUT_PREFIX);
    key.extend(output_id.to_bytes());
    key
}

fn address_scoped_key(prefix: u8, address: &Address, output_id: &OutputId) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + HASH_SIZE_BYTES + OUTPUT_ID_SIZE_BYTES);
    key.push(prefix);
    key.extend(address.to_bytes());
    key.extend(output_id.to_bytes());
    key
}

fn address_scan_prefix(prefix: u8, address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + HASH_SIZE_BYTES);
    key.push(prefix);
    key.extend(address.to_bytes());
    key
}

fn diff_key(index: MilestoneIndex) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + 4);
    key.push(DIFF_PREFIX);
    key.extend(index.to_le_bytes());
    key
}

/// Decodes the output id carried in the trailing bytes of an address-scoped
/// key.
fn output_id_from_key(key: &[u8]) -> Result<OutputId, LedgerError> {
    let suffix = key
        .get(1 + HASH_SIZE_BYTES..)
        .ok_or_else(|| LedgerError::DecodeError(format!("ledger key too short: {}", key.len())))?;
    let (rest, output_id) = OutputIdDeserializer::new()
        .deserialize::<DeserializeError>(suffix)
        .map_err(|err| LedgerError::DecodeError(err.to_string()))?;
    if !rest.is_empty() {
        return Err(LedgerError::DecodeError(format!(
            "trailing bytes in ledger key: {}",
            rest.len()
        )));
    }
    Ok(output_id)
}

/// The four UTXO sub-indices over one injected store. Lock-free by itself;
/// [`crate::UtxoLedger`] wraps it behind the process-wide ledger gate.
pub struct LedgerDB {
    store: ShareableStore,
    output_serializer: OutputSerializer,
    diff_serializer: MilestoneDiffSerializer,
}

impl std::fmt::Debug for LedgerDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerDB").field("store", &self.store).finish()
    }
}

impl LedgerDB {
    /// Creates a `LedgerDB` over the given backing store.
    pub fn new(store: ShareableStore) -> Self {
        LedgerDB {
            store,
            output_serializer: OutputSerializer::new(),
            diff_serializer: MilestoneDiffSerializer::new(),
        }
    }

    /// Point read of an output record.
    pub fn get_output(&self, output_id: &OutputId) -> Result<Option<Output>, LedgerError> {
        match self.store.get(&output_key(output_id))? {
            Some(value) => decode_output(*output_id, &value).map(Some),
            None => Ok(None),
        }
    }

    /// Whether the output is unspent, re-derived from the unspent index.
    pub fn is_output_unspent(&self, output_id: &OutputId) -> Result<bool, LedgerError> {
        let output = self
            .get_output(output_id)?
            .ok_or(LedgerError::OutputNotFound(*output_id))?;
        let marker = self
            .store
            .get(&address_scoped_key(UNSPENT_PREFIX, &output.address, output_id))?;
        Ok(marker.is_some())
    }

    /// All unspent outputs addressed to `address`, joined back to their
    /// output records.
    pub fn unspent_outputs_for_address(
        &self,
        address: &Address,
    ) -> Result<Vec<Output>, LedgerError> {
        let mut outputs = Vec::new();
        for item in self
            .store
            .prefix_iterator(&address_scan_prefix(UNSPENT_PREFIX, address))
        {
            let (key, _value) = item?;
            let output_id = output_id_from_key(&key)?;
            match self.get_output(&output_id)? {
                Some(output) => outputs.push(output),
                // marker without record: recoverable index damage, skip
                None => warn!("unspent marker for {} has no output record", output_id),
            }
        }
        Ok(outputs)
    }

    /// All spent outputs that were addressed to `address`, each joined with
    /// the consuming transaction and its output record.
    pub fn spent_outputs_for_address(&self, address: &Address) -> Result<Vec<Spent>, LedgerError> {
        let mut spents = Vec::new();
        for item in self
            .store
            .prefix_iterator(&address_scan_prefix(SPENT_PREFIX, address))
        {
            let (key, value) = item?;
            let output_id = output_id_from_key(&key)?;
            let target_transaction_id = TransactionId::from_bytes(&value)
                .map_err(|err| LedgerError::DecodeError(err.to_string()))?;
            match self.get_output(&output_id)? {
                Some(output) => spents.push(Spent::new(output, target_transaction_id)),
                None => warn!("spent record for {} has no output record", output_id),
            }
        }
        Ok(spents)
    }

    /// The diff journal entry of the milestone at `index`.
    pub fn get_milestone_diff(
        &self,
        index: MilestoneIndex,
    ) -> Result<Option<MilestoneDiff>, LedgerError> {
        let value = match self.store.get(&diff_key(index))? {
            Some(value) => value,
            None => return Ok(None),
        };
        let (rest, diff) = MilestoneDiffDeserializer::new(index)
            .deserialize::<DeserializeError>(&value)
            .map_err(|err| LedgerError::DecodeError(err.to_string()))?;
        if !rest.is_empty() {
            return Err(LedgerError::DecodeError(format!(
                "trailing bytes in milestone diff {}: {}",
                index,
                rest.len()
            )));
        }
        Ok(Some(diff))
    }

    /// Stages and commits one confirmed milestone as a single atomic batch.
    ///
    /// Every spent output must already exist, either in the store or among
    /// the new outputs of this very call; otherwise the whole call fails
    /// with [`LedgerError::OutputNotFound`] and nothing is written.
    pub fn apply_confirmation(
        &mut self,
        index: MilestoneIndex,
        new_outputs: &[Output],
        new_spents: &[Spent],
    ) -> Result<(), LedgerError> {
        let mut batch = DBBatch::new();

        for output in new_outputs {
            let mut value = Vec::with_capacity(OUTPUT_VALUE_SIZE_BYTES);
            self.output_serializer.serialize(output, &mut value)?;
            batch.insert(output_key(&output.id), Some(value));
            batch.insert(
                address_scoped_key(UNSPENT_PREFIX, &output.address, &output.id),
                Some(Vec::new()),
            );
        }

        for spent in new_spents {
            let key = output_key(&spent.output.id);
            let staged = matches!(batch.get(&key), Some(Some(_)));
            if !staged && self.store.get(&key)?.is_none() {
                // abort before commit: dropping the batch cancels everything
                // staged so far
                return Err(LedgerError::OutputNotFound(spent.output.id));
            }
            batch.insert(
                address_scoped_key(SPENT_PREFIX, &spent.output.address, &spent.output.id),
                Some(spent.target_transaction_id.to_bytes().to_vec()),
            );
            batch.insert(
                address_scoped_key(UNSPENT_PREFIX, &spent.output.address, &spent.output.id),
                None,
            );
        }

        let diff = MilestoneDiff {
            index,
            created_outputs: new_outputs.iter().map(|output| output.id).collect(),
            consumed_outputs: new_spents
                .iter()
                .map(|spent| (spent.output.address, spent.output.id))
                .collect(),
        };
        let mut diff_value = Vec::new();
        self.diff_serializer.serialize(&diff, &mut diff_value)?;
        batch.insert(diff_key(index), Some(diff_value));

        self.store.write_batch(batch)?;
        debug!(
            "applied milestone {}: {} outputs created, {} spent",
            index,
            new_outputs.len(),
            new_spents.len()
        );
        Ok(())
    }
}

fn decode_output(output_id: OutputId, value: &[u8]) -> Result<Output, LedgerError> {
    if value.len() != OUTPUT_VALUE_SIZE_BYTES {
        return Err(LedgerError::DecodeError(format!(
            "output value for {} has length {}, expected {}",
            output_id,
            value.len(),
            OUTPUT_VALUE_SIZE_BYTES
        )));
    }
    OutputDeserializer::new(output_id)
        .deserialize::<DeserializeError>(value)
        .map(|(_rest, output)| output)
        .map_err(|err| LedgerError::DecodeError(err.to_string()))
}
