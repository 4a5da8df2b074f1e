// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use nom::error::{context, ContextError, ParseError};
use nom::number::complete::{le_u16, le_u64};
use nom::sequence::tuple;
use nom::IResult;
use serde::{Deserialize, Serialize};
use weave_hash::{HashDeserializer, HASH_SIZE_BYTES};
use weave_models::address::Address;
use weave_models::transaction_id::TransactionId;
use weave_serialization::{Deserializer, SerializeError, Serializer};

/// Size of a serialized [`OutputId`]: transaction id plus output index.
pub const OUTPUT_ID_SIZE_BYTES: usize = HASH_SIZE_BYTES + 2;

/// Size of the stored value of an output: address plus amount.
pub const OUTPUT_VALUE_SIZE_BYTES: usize = HASH_SIZE_BYTES + 8;

/// Identity of a transaction output: the producing transaction and the
/// position of the output within it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OutputId {
    /// Transaction that produced the output.
    pub transaction_id: TransactionId,
    /// Position of the output within the producing transaction.
    pub output_index: u16,
}

impl OutputId {
    /// Creates an `OutputId`.
    pub fn new(transaction_id: TransactionId, output_index: u16) -> Self {
        OutputId {
            transaction_id,
            output_index,
        }
    }

    /// The wire representation: transaction id followed by the little-endian
    /// output index.
    pub fn to_bytes(&self) -> [u8; OUTPUT_ID_SIZE_BYTES] {
        let mut bytes = [0u8; OUTPUT_ID_SIZE_BYTES];
        bytes[..HASH_SIZE_BYTES].copy_from_slice(&self.transaction_id.to_bytes());
        bytes[HASH_SIZE_BYTES..].copy_from_slice(&self.output_index.to_le_bytes());
        bytes
    }
}

impl std::fmt::Display for OutputId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.transaction_id, self.output_index)
    }
}

/// Serializer for [`OutputId`]
#[derive(Default, Clone)]
pub struct OutputIdSerializer;

impl OutputIdSerializer {
    /// Creates an `OutputIdSerializer`
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<OutputId> for OutputIdSerializer {
    fn serialize(&self, value: &OutputId, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for [`OutputId`]
#[derive(Default, Clone)]
pub struct OutputIdDeserializer {
    hash_deserializer: HashDeserializer,
}

impl OutputIdDeserializer {
    /// Creates an `OutputIdDeserializer`
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deserializer<OutputId> for OutputIdDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], OutputId, E> {
        context(
            "Failed output id deserialization",
            tuple((|input| self.hash_deserializer.deserialize(input), le_u16)),
        )(buffer)
        .map(|(rest, (hash, output_index))| {
            (
                rest,
                OutputId {
                    transaction_id: TransactionId(hash),
                    output_index,
                },
            )
        })
    }
}

/// A transaction output: an amount of funds addressed to a recipient.
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Identity of the output.
    pub id: OutputId,
    /// Recipient address.
    pub address: Address,
    /// Amount of funds carried.
    pub amount: u64,
}

impl Output {
    /// Creates an `Output`.
    pub fn new(id: OutputId, address: Address, amount: u64) -> Self {
        Output {
            id,
            address,
            amount,
        }
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.id, self.address, self.amount)
    }
}

/// Serializer for the stored value of an [`Output`]: the identity lives in
/// the key, so only address and amount are written.
#[derive(Default, Clone)]
pub struct OutputSerializer;

impl OutputSerializer {
    /// Creates an `OutputSerializer`
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<Output> for OutputSerializer {
    fn serialize(&self, value: &Output, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.address.to_bytes());
        buffer.extend(value.amount.to_le_bytes());
        Ok(())
    }
}

/// Deserializer for the stored value of an [`Output`], re-attaching the
/// identity taken from the key.
#[derive(Clone)]
pub struct OutputDeserializer {
    id: OutputId,
    hash_deserializer: HashDeserializer,
}

impl OutputDeserializer {
    /// Creates an `OutputDeserializer` for the output stored under `id`.
    pub fn new(id: OutputId) -> Self {
        Self {
            id,
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<Output> for OutputDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Output, E> {
        context(
            "Failed output deserialization",
            tuple((|input| self.hash_deserializer.deserialize(input), le_u64)),
        )(buffer)
        .map(|(rest, (hash, amount))| {
            (
                rest,
                Output {
                    id: self.id,
                    address: Address(hash),
                    amount,
                },
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use weave_hash::Hash;
    use weave_serialization::DeserializeError;

    fn fixture_output() -> Output {
        let transaction_id =
            TransactionId(Hash::from_bytes(&hex!(
                "0101010101010101010101010101010101010101010101010101010101010101"
            ))
            .unwrap());
        let address = Address(Hash::from_bytes(&hex!(
            "0202020202020202020202020202020202020202020202020202020202020202"
        ))
        .unwrap());
        Output::new(OutputId::new(transaction_id, 5), address, 1_000_000)
    }

    #[test]
    fn test_output_id_bytes_layout() {
        let output = fixture_output();
        let bytes = output.id.to_bytes();
        assert_eq!(bytes.len(), OUTPUT_ID_SIZE_BYTES);
        assert_eq!(&bytes[..32], &[0x01; 32]);
        // index is little-endian
        assert_eq!(&bytes[32..], &[5, 0]);

        let (rest, decoded) = OutputIdDeserializer::new()
            .deserialize::<DeserializeError>(&bytes)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, output.id);
    }

    #[test]
    fn test_output_value_round_trip() {
        let output = fixture_output();
        let mut value = Vec::new();
        OutputSerializer::new().serialize(&output, &mut value).unwrap();
        assert_eq!(value.len(), OUTPUT_VALUE_SIZE_BYTES);
        assert_eq!(&value[..32], &[0x02; 32]);
        assert_eq!(&value[32..], &1_000_000u64.to_le_bytes());

        let (rest, decoded) = OutputDeserializer::new(output.id)
            .deserialize::<DeserializeError>(&value)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, output);
    }

    #[test]
    fn test_truncated_output_value_fails() {
        let output = fixture_output();
        let mut value = Vec::new();
        OutputSerializer::new().serialize(&output, &mut value).unwrap();
        value.truncate(35);
        assert!(OutputDeserializer::new(output.id)
            .deserialize::<DeserializeError>(&value)
            .is_err());
    }
}
