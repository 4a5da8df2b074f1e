// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the hash value type
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum WeaveHashError {
    /// invalid hash length: expected 32 bytes, got {0}
    InvalidLength(usize),
    /// hash parsing error: {0}
    ParsingError(String),
}
