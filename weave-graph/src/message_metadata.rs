// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use nom::error::{context, ContextError, ParseError};
use nom::number::complete::{le_u32, le_u8};
use nom::IResult;
use std::time::{SystemTime, UNIX_EPOCH};
use weave_hash::HashDeserializer;
use weave_models::message_id::MessageId;
use weave_models::milestone::{
    MilestoneIndex, MilestoneIndexDeserializer, MilestoneIndexSerializer,
};
use weave_serialization::{Deserializer, SerializeError, Serializer};

const METADATA_SOLID: u8 = 0b0000_0001;
const METADATA_CONFIRMED: u8 = 0b0000_0010;
const METADATA_CONFLICTING: u8 = 0b0000_0100;

/// Size of the persisted metadata value:
/// 1 byte status bitmask, 5 * 4 bytes of u32 fields, 2 * 32 bytes of parents.
pub const METADATA_VALUE_SIZE_BYTES: usize = 85;

/// Mutable confirmed-state record of one DAG vertex.
///
/// Identity and parents are fixed at creation; status flags and indices
/// mutate in place over the vertex lifetime. The `modified` marker tracks
/// whether the record diverged from its persisted form.
#[derive(Debug, Clone)]
pub struct MessageMetadata {
    message_id: MessageId,
    parent1: MessageId,
    parent2: MessageId,

    solid: bool,
    confirmed: bool,
    conflicting: bool,

    /// Unix time (seconds) when the message became solid, zero while unsolid
    solidification_timestamp: u32,
    /// index of the milestone which confirmed this message, zero while unconfirmed
    confirmation_index: MilestoneIndex,

    /// highest confirmed index in the past cone of this message
    youngest_cone_root_index: MilestoneIndex,
    /// lowest confirmed index in the past cone of this message
    oldest_cone_root_index: MilestoneIndex,
    /// index the cone root indices were calculated at
    cone_root_calculation_index: MilestoneIndex,

    modified: bool,
}

impl MessageMetadata {
    /// Creates a fresh, not-yet-persisted record: all flags false, all
    /// indices zero, marked modified so the next flush writes it out.
    pub fn new(message_id: MessageId, parent1: MessageId, parent2: MessageId) -> Self {
        MessageMetadata {
            message_id,
            parent1,
            parent2,
            solid: false,
            confirmed: false,
            conflicting: false,
            solidification_timestamp: 0,
            confirmation_index: MilestoneIndex(0),
            youngest_cone_root_index: MilestoneIndex(0),
            oldest_cone_root_index: MilestoneIndex(0),
            cone_root_calculation_index: MilestoneIndex(0),
            modified: true,
        }
    }

    /// Identity of the message this record belongs to.
    pub fn message_id(&self) -> MessageId {
        self.message_id
    }

    /// First DAG parent reference.
    pub fn parent1(&self) -> MessageId {
        self.parent1
    }

    /// Second DAG parent reference.
    pub fn parent2(&self) -> MessageId {
        self.parent2
    }

    /// Whether the whole past cone of the message is known.
    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Unix time (seconds) of the false→true solidity transition, zero otherwise.
    pub fn solidification_timestamp(&self) -> u32 {
        self.solidification_timestamp
    }

    /// Sets the solidity flag, stamping the solidification time on
    /// activation and zeroing it on deactivation. Setting the current value
    /// again is a no-op that does not dirty the record.
    pub fn set_solid(&mut self, solid: bool) {
        if solid != self.solid {
            self.solidification_timestamp = if solid { unix_timestamp_secs() } else { 0 };
            self.solid = solid;
            self.modified = true;
        }
    }

    /// Whether a milestone confirmed this message.
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Confirmation flag together with the confirming milestone index.
    pub fn get_confirmed(&self) -> (bool, MilestoneIndex) {
        (self.confirmed, self.confirmation_index)
    }

    /// Sets the confirmation flag and index, following the same
    /// change-detection rule as [`MessageMetadata::set_solid`].
    pub fn set_confirmed(&mut self, confirmed: bool, confirmation_index: MilestoneIndex) {
        if confirmed != self.confirmed {
            self.confirmation_index = if confirmed {
                confirmation_index
            } else {
                MilestoneIndex(0)
            };
            self.confirmed = confirmed;
            self.modified = true;
        }
    }

    /// Whether the message was marked as part of a conflicting sub-DAG.
    pub fn is_conflicting(&self) -> bool {
        self.conflicting
    }

    /// Sets the conflicting flag; no-op when unchanged.
    pub fn set_conflicting(&mut self, conflicting: bool) {
        if conflicting != self.conflicting {
            self.conflicting = conflicting;
            self.modified = true;
        }
    }

    /// The (youngest, oldest, calculated-at) cone root indices.
    pub fn cone_root_indexes(&self) -> (MilestoneIndex, MilestoneIndex, MilestoneIndex) {
        (
            self.youngest_cone_root_index,
            self.oldest_cone_root_index,
            self.cone_root_calculation_index,
        )
    }

    /// Overwrites the three cone root indices together. They are always
    /// recomputed as a unit, so there is no change detection: this always
    /// dirties the record.
    pub fn set_cone_root_indexes(
        &mut self,
        ycri: MilestoneIndex,
        ocri: MilestoneIndex,
        calculation_index: MilestoneIndex,
    ) {
        self.youngest_cone_root_index = ycri;
        self.oldest_cone_root_index = ocri;
        self.cone_root_calculation_index = calculation_index;
        self.modified = true;
    }

    /// Whether the record diverged from its persisted form.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Sets the dirty marker, cleared by the store after a successful flush.
    pub fn set_modified(&mut self, modified: bool) {
        self.modified = modified;
    }
}

fn unix_timestamp_secs() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as u32)
        .unwrap_or(0)
}

/// Serializer for the 85-byte metadata value. The key (the message ID) is
/// stored separately by the metadata store.
#[derive(Default, Clone)]
pub struct MessageMetadataSerializer {
    index_serializer: MilestoneIndexSerializer,
}

impl MessageMetadataSerializer {
    /// Creates a `MessageMetadataSerializer`
    pub fn new() -> Self {
        Self {
            index_serializer: MilestoneIndexSerializer::new(),
        }
    }
}

impl Serializer<MessageMetadata> for MessageMetadataSerializer {
    fn serialize(
        &self,
        value: &MessageMetadata,
        buffer: &mut Vec<u8>,
    ) -> Result<(), SerializeError> {
        let mut status = 0u8;
        if value.solid {
            status |= METADATA_SOLID;
        }
        if value.confirmed {
            status |= METADATA_CONFIRMED;
        }
        if value.conflicting {
            status |= METADATA_CONFLICTING;
        }
        buffer.push(status);
        buffer.extend(value.solidification_timestamp.to_le_bytes());
        self.index_serializer
            .serialize(&value.confirmation_index, buffer)?;
        self.index_serializer
            .serialize(&value.youngest_cone_root_index, buffer)?;
        self.index_serializer
            .serialize(&value.oldest_cone_root_index, buffer)?;
        self.index_serializer
            .serialize(&value.cone_root_calculation_index, buffer)?;
        buffer.extend(value.parent1.to_bytes());
        buffer.extend(value.parent2.to_bytes());
        Ok(())
    }
}

/// Deserializer for the 85-byte metadata value.
///
/// The message ID is not part of the value: it is taken from the store key
/// and injected at construction. Decoded records start out clean (not
/// modified).
pub struct MessageMetadataDeserializer {
    message_id: MessageId,
    index_deserializer: MilestoneIndexDeserializer,
    hash_deserializer: HashDeserializer,
}

impl MessageMetadataDeserializer {
    /// Creates a `MessageMetadataDeserializer` for the record stored under
    /// `message_id`.
    pub fn new(message_id: MessageId) -> Self {
        Self {
            message_id,
            index_deserializer: MilestoneIndexDeserializer::new(),
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<MessageMetadata> for MessageMetadataDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], MessageMetadata, E> {
        context("Failed message metadata deserialization", |input| {
            let (rest, status) = le_u8(input)?;
            let (rest, solidification_timestamp) = le_u32(rest)?;
            let (rest, confirmation_index) = self.index_deserializer.deserialize(rest)?;
            let (rest, youngest_cone_root_index) = self.index_deserializer.deserialize(rest)?;
            let (rest, oldest_cone_root_index) = self.index_deserializer.deserialize(rest)?;
            let (rest, cone_root_calculation_index) = self.index_deserializer.deserialize(rest)?;
            let (rest, parent1) = self.hash_deserializer.deserialize(rest)?;
            let (rest, parent2) = self.hash_deserializer.deserialize(rest)?;
            Ok((
                rest,
                MessageMetadata {
                    message_id: self.message_id,
                    parent1: MessageId(parent1),
                    parent2: MessageId(parent2),
                    solid: status & METADATA_SOLID != 0,
                    confirmed: status & METADATA_CONFIRMED != 0,
                    conflicting: status & METADATA_CONFLICTING != 0,
                    solidification_timestamp,
                    confirmation_index,
                    youngest_cone_root_index,
                    oldest_cone_root_index,
                    cone_root_calculation_index,
                    modified: false,
                },
            ))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_hash::Hash;
    use weave_serialization::DeserializeError;

    fn message_id(fill: u8) -> MessageId {
        MessageId(Hash::from_bytes(&[fill; 32]).unwrap())
    }

    fn example() -> MessageMetadata {
        MessageMetadata::new(message_id(0x01), message_id(0x11), message_id(0x22))
    }

    #[test]
    fn test_set_solid_is_idempotent() {
        let mut metadata = example();
        metadata.set_modified(false);

        metadata.set_solid(true);
        assert!(metadata.is_solid());
        assert!(metadata.is_modified());
        let timestamp = metadata.solidification_timestamp();
        assert_ne!(timestamp, 0);

        // the second activation is a full no-op
        metadata.set_modified(false);
        metadata.set_solid(true);
        assert!(!metadata.is_modified());
        assert_eq!(metadata.solidification_timestamp(), timestamp);

        metadata.set_solid(false);
        assert!(metadata.is_modified());
        assert_eq!(metadata.solidification_timestamp(), 0);
    }

    #[test]
    fn test_set_confirmed_keeps_first_index() {
        let mut metadata = example();

        metadata.set_confirmed(true, MilestoneIndex(42));
        assert_eq!(metadata.get_confirmed(), (true, MilestoneIndex(42)));

        // already confirmed: the new index must not overwrite the old one
        metadata.set_confirmed(true, MilestoneIndex(99));
        assert_eq!(metadata.get_confirmed(), (true, MilestoneIndex(42)));

        metadata.set_confirmed(false, MilestoneIndex(7));
        assert_eq!(metadata.get_confirmed(), (false, MilestoneIndex(0)));
    }

    #[test]
    fn test_set_cone_root_indexes_always_dirties() {
        let mut metadata = example();
        metadata.set_modified(false);

        metadata.set_cone_root_indexes(MilestoneIndex(8), MilestoneIndex(3), MilestoneIndex(9));
        assert!(metadata.is_modified());
        assert_eq!(
            metadata.cone_root_indexes(),
            (MilestoneIndex(8), MilestoneIndex(3), MilestoneIndex(9))
        );

        metadata.set_modified(false);
        metadata.set_cone_root_indexes(MilestoneIndex(8), MilestoneIndex(3), MilestoneIndex(9));
        assert!(metadata.is_modified());
    }

    #[test]
    fn test_value_round_trip() {
        let mut metadata = example();
        metadata.set_solid(true);
        metadata.set_confirmed(true, MilestoneIndex(1337));
        metadata.set_conflicting(true);
        metadata.set_cone_root_indexes(MilestoneIndex(5), MilestoneIndex(2), MilestoneIndex(6));

        let mut value = Vec::new();
        MessageMetadataSerializer::new()
            .serialize(&metadata, &mut value)
            .unwrap();
        assert_eq!(value.len(), METADATA_VALUE_SIZE_BYTES);
        // parents sit in the trailing 64 bytes
        assert_eq!(&value[21..53], &[0x11; 32]);
        assert_eq!(&value[53..85], &[0x22; 32]);

        let (rest, decoded) = MessageMetadataDeserializer::new(metadata.message_id())
            .deserialize::<DeserializeError>(&value)
            .unwrap();
        assert!(rest.is_empty());
        assert!(!decoded.is_modified());
        assert_eq!(decoded.message_id(), metadata.message_id());
        assert_eq!(decoded.parent1(), metadata.parent1());
        assert_eq!(decoded.parent2(), metadata.parent2());
        assert_eq!(decoded.is_solid(), metadata.is_solid());
        assert_eq!(decoded.get_confirmed(), metadata.get_confirmed());
        assert_eq!(decoded.is_conflicting(), metadata.is_conflicting());
        assert_eq!(
            decoded.solidification_timestamp(),
            metadata.solidification_timestamp()
        );
        assert_eq!(decoded.cone_root_indexes(), metadata.cone_root_indexes());
    }

    #[test]
    fn test_layout_offsets() {
        let mut metadata = example();
        metadata.set_confirmed(true, MilestoneIndex(0x0403_0201));

        let mut value = Vec::new();
        MessageMetadataSerializer::new()
            .serialize(&metadata, &mut value)
            .unwrap();
        assert_eq!(value[0], METADATA_CONFIRMED);
        // confirmation index at offset 5, little-endian
        assert_eq!(&value[5..9], &[0x01, 0x02, 0x03, 0x04]);
    }
}
