// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use nom::error::{context, ContextError, ParseError};
use nom::number::complete::le_u32;
use nom::IResult;
use serde::{Deserialize, Serialize};
use weave_serialization::{Deserializer, SerializeError, Serializer};

/// Index of a milestone: the totally-ordered confirmation checkpoints of the
/// DAG. Stored as 4 little-endian bytes everywhere it is persisted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct MilestoneIndex(pub u32);

impl std::fmt::Display for MilestoneIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for MilestoneIndex {
    fn from(value: u32) -> Self {
        MilestoneIndex(value)
    }
}

impl MilestoneIndex {
    /// Little-endian wire representation.
    pub fn to_le_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

/// Serializer for [`MilestoneIndex`]
#[derive(Default, Clone)]
pub struct MilestoneIndexSerializer;

impl MilestoneIndexSerializer {
    /// Creates a `MilestoneIndexSerializer`
    pub fn new() -> Self {
        Self
    }
}

impl Serializer<MilestoneIndex> for MilestoneIndexSerializer {
    fn serialize(&self, value: &MilestoneIndex, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_le_bytes());
        Ok(())
    }
}

/// Deserializer for [`MilestoneIndex`]
#[derive(Default, Clone)]
pub struct MilestoneIndexDeserializer;

impl MilestoneIndexDeserializer {
    /// Creates a `MilestoneIndexDeserializer`
    pub fn new() -> Self {
        Self
    }
}

impl Deserializer<MilestoneIndex> for MilestoneIndexDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], MilestoneIndex, E> {
        context("Failed milestone index deserialization", |input| {
            le_u32(input).map(|(rest, index)| (rest, MilestoneIndex(index)))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_serialization::DeserializeError;

    #[test]
    fn test_milestone_index_round_trip() {
        let index = MilestoneIndex(0xDEAD_BEEF);
        let mut buffer = Vec::new();
        MilestoneIndexSerializer::new()
            .serialize(&index, &mut buffer)
            .unwrap();
        assert_eq!(buffer, vec![0xEF, 0xBE, 0xAD, 0xDE]);
        let (rest, deserialized) = MilestoneIndexDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(deserialized, index);
    }
}
