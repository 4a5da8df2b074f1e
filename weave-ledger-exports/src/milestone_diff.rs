// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::output::{OutputId, OutputIdDeserializer, OutputIdSerializer};
use nom::error::{context, ContextError, ParseError};
use nom::multi::length_count;
use nom::number::complete::le_u32;
use nom::sequence::tuple;
use nom::IResult;
use serde::{Deserialize, Serialize};
use weave_hash::HashDeserializer;
use weave_models::address::Address;
use weave_models::milestone::MilestoneIndex;
use weave_serialization::{Deserializer, SerializeError, Serializer};

/// Journal entry of one confirmation: the output ids created and the
/// (address, output id) pairs consumed by a milestone, in the exact order
/// they were applied. Write-once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneDiff {
    /// Index of the applying milestone.
    pub index: MilestoneIndex,
    /// Ids of the outputs created by the milestone.
    pub created_outputs: Vec<OutputId>,
    /// Address and id of each output consumed by the milestone.
    pub consumed_outputs: Vec<(Address, OutputId)>,
}

/// Serializer for the stored value of a [`MilestoneDiff`]: the index lives
/// in the key, so only the two counted lists are written.
#[derive(Default, Clone)]
pub struct MilestoneDiffSerializer {
    output_id_serializer: OutputIdSerializer,
}

impl MilestoneDiffSerializer {
    /// Creates a `MilestoneDiffSerializer`
    pub fn new() -> Self {
        Self::default()
    }
}

impl Serializer<MilestoneDiff> for MilestoneDiffSerializer {
    fn serialize(&self, value: &MilestoneDiff, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let created_count: u32 = value.created_outputs.len().try_into().map_err(|_| {
            SerializeError::NumberTooBig(format!(
                "diff created-output count {} does not fit in u32",
                value.created_outputs.len()
            ))
        })?;
        buffer.extend(created_count.to_le_bytes());
        for output_id in &value.created_outputs {
            self.output_id_serializer.serialize(output_id, buffer)?;
        }

        let consumed_count: u32 = value.consumed_outputs.len().try_into().map_err(|_| {
            SerializeError::NumberTooBig(format!(
                "diff consumed-output count {} does not fit in u32",
                value.consumed_outputs.len()
            ))
        })?;
        buffer.extend(consumed_count.to_le_bytes());
        for (address, output_id) in &value.consumed_outputs {
            buffer.extend(address.to_bytes());
            self.output_id_serializer.serialize(output_id, buffer)?;
        }
        Ok(())
    }
}

/// Deserializer for the stored value of a [`MilestoneDiff`], re-attaching
/// the index taken from the key.
#[derive(Clone)]
pub struct MilestoneDiffDeserializer {
    index: MilestoneIndex,
    output_id_deserializer: OutputIdDeserializer,
    hash_deserializer: HashDeserializer,
}

impl MilestoneDiffDeserializer {
    /// Creates a `MilestoneDiffDeserializer` for the diff stored under
    /// `index`.
    pub fn new(index: MilestoneIndex) -> Self {
        Self {
            index,
            output_id_deserializer: OutputIdDeserializer::new(),
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<MilestoneDiff> for MilestoneDiffDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], MilestoneDiff, E> {
        context(
            "Failed milestone diff deserialization",
            tuple((
                length_count(le_u32, |input| {
                    self.output_id_deserializer.deserialize(input)
                }),
                length_count(
                    le_u32,
                    tuple((
                        |input| self.hash_deserializer.deserialize(input),
                        |input| self.output_id_deserializer.deserialize(input),
                    )),
                ),
            )),
        )(buffer)
        .map(|(rest, (created_outputs, consumed))| {
            (
                rest,
                MilestoneDiff {
                    index: self.index,
                    created_outputs,
                    consumed_outputs: consumed
                        .into_iter()
                        .map(|(hash, output_id)| (Address(hash), output_id))
                        .collect(),
                },
            )
        })
    }
}
