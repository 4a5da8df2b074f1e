// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use crate::error::WeaveHashError;
use crate::settings::HASH_SIZE_BYTES;
use nom::bytes::complete::take;
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use std::convert::TryInto;
use std::str::FromStr;
use weave_serialization::Deserializer;

/// Opaque fixed-length hash value.
///
/// Identifies messages, transactions and addresses; the raw 32 bytes are the
/// durable on-disk representation.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct Hash([u8; HASH_SIZE_BYTES]);

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Hash {
    /// The all-zero hash, used as the genesis parent reference.
    pub const fn zero() -> Self {
        Hash([0u8; HASH_SIZE_BYTES])
    }

    /// Deserialize a Hash from raw bytes.
    ///
    /// Fails with [`WeaveHashError::InvalidLength`] on any slice whose length
    /// is not exactly [`HASH_SIZE_BYTES`].
    pub fn from_bytes(data: &[u8]) -> Result<Hash, WeaveHashError> {
        data.try_into()
            .map(Hash)
            .map_err(|_| WeaveHashError::InvalidLength(data.len()))
    }

    /// Serialize the Hash as a fixed-size byte array.
    pub fn to_bytes(&self) -> [u8; HASH_SIZE_BYTES] {
        self.0
    }

    /// Convert into the fixed-size byte array.
    pub fn into_bytes(self) -> [u8; HASH_SIZE_BYTES] {
        self.0
    }

    /// Borrow the raw bytes, mostly for key construction.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.0
    }

    /// Lowercase hex representation of the raw bytes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Hash {
    type Err = WeaveHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|err| WeaveHashError::ParsingError(err.to_string()))?;
        Hash::from_bytes(&decoded)
    }
}

impl ::serde::Serialize for Hash {
    /// Human-readable serialization uses the hex representation, binary
    /// serialization the raw bytes.
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_hex())
        } else {
            s.serialize_bytes(&self.0)
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Hash {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        if d.is_human_readable() {
            struct HexVisitor;

            impl<'de> ::serde::de::Visitor<'de> for HexVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("an ASCII hex string")
                }

                fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Hash::from_str(v).map_err(E::custom)
                }
            }
            d.deserialize_str(HexVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: ::serde::de::Error,
                {
                    Hash::from_bytes(v).map_err(E::custom)
                }
            }
            d.deserialize_bytes(BytesVisitor)
        }
    }
}

/// Deserializer for [`Hash`], consuming exactly [`HASH_SIZE_BYTES`] bytes.
#[derive(Default, Clone)]
pub struct HashDeserializer;

impl HashDeserializer {
    /// Creates a `HashDeserializer`
    pub fn new() -> Self {
        Self
    }
}

impl Deserializer<Hash> for HashDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Hash, E> {
        context("Failed hash deserialization", |input: &'a [u8]| {
            let (rest, bytes) = take(HASH_SIZE_BYTES)(input)?;
            let hash = Hash::from_bytes(bytes).map_err(|_| {
                nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::LengthValue,
                ))
            })?;
            Ok((rest, hash))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use weave_serialization::DeserializeError;

    fn example() -> Hash {
        let mut bytes = [0u8; HASH_SIZE_BYTES];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = i as u8;
        }
        Hash::from_bytes(&bytes).unwrap()
    }

    #[test]
    #[serial]
    fn test_serde_json() {
        let hash = example();
        let serialized = serde_json::to_string(&hash).unwrap();
        let deserialized = serde_json::from_str(&serialized).unwrap();
        assert_eq!(hash, deserialized)
    }

    #[test]
    #[serial]
    fn test_invalid_length_rejected() {
        // 31 bytes must not be silently padded
        let short = [0xAAu8; HASH_SIZE_BYTES - 1];
        assert_eq!(
            Hash::from_bytes(&short),
            Err(WeaveHashError::InvalidLength(31))
        );
        let long = [0xAAu8; HASH_SIZE_BYTES + 1];
        assert_eq!(
            Hash::from_bytes(&long),
            Err(WeaveHashError::InvalidLength(33))
        );
    }

    #[test]
    #[serial]
    fn test_hex_round_trip() {
        let hash = example();
        assert_eq!(Hash::from_str(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    #[serial]
    fn test_hash_deserializer() {
        let hash = example();
        let mut buffer = hash.to_bytes().to_vec();
        buffer.push(0xFF);
        let (rest, deserialized) = HashDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert_eq!(deserialized, hash);
        assert_eq!(rest, &[0xFF]);
    }
}
