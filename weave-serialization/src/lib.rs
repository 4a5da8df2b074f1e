// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Serialization traits shared by every crate that writes to or reads from
//! the durable store. All persisted layouts are fixed binary formats, so the
//! serializers write straight into a caller-provided buffer and the
//! deserializers are nom parsers over borrowed bytes.

use displaydoc::Display;
use nom::error::{ContextError, ErrorKind, FromExternalError, ParseError, VerboseErrorKind};
use nom::IResult;
use thiserror::Error;

#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum SerializeError {
    /// Number {0} is too big to be serialized
    NumberTooBig(String),
    /// General error {0}
    GeneralError(String),
}

/// Serializes a value of type `T` into the given byte buffer.
pub trait Serializer<T> {
    /// Appends the serialized form of `value` to `buffer`.
    fn serialize(&self, value: &T, buffer: &mut Vec<u8>) -> Result<(), SerializeError>;
}

/// Deserializes a value of type `T` from a byte buffer.
pub trait Deserializer<T> {
    /// Parses `buffer`, returning the unconsumed rest and the value.
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], T, E>;
}

/// Error instantiation of the nom parsers behind [`Deserializer`], keeping
/// the context chain for display.
#[derive(Clone)]
pub struct DeserializeError<'a> {
    errors: Vec<(&'a [u8], VerboseErrorKind)>,
}

impl<'a> ParseError<&'a [u8]> for DeserializeError<'a> {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        Self {
            errors: vec![(input, VerboseErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a [u8], kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, VerboseErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a [u8]> for DeserializeError<'a> {
    fn add_context(input: &'a [u8], ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, VerboseErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a [u8], E> for DeserializeError<'a> {
    fn from_external_error(input: &'a [u8], kind: ErrorKind, _e: E) -> Self {
        Self::from_error_kind(input, kind)
    }
}

impl<'a> std::fmt::Display for DeserializeError<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // outermost context first
        for (input, error) in self.errors.iter().rev() {
            match error {
                VerboseErrorKind::Context(ctx) => write!(f, "{} / ", ctx)?,
                VerboseErrorKind::Nom(kind) => write!(f, "{:?} / ", kind)?,
                VerboseErrorKind::Char(c) => write!(f, "expected '{}' / ", c)?,
            }
            let displayed = &input[..input.len().min(32)];
            write!(f, "input: {:?} ", displayed)?;
        }
        Ok(())
    }
}

impl<'a> std::fmt::Debug for DeserializeError<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}
