// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

//! Fixed-length opaque hash value used as message ID, transaction ID and
//! address throughout the node. The length is part of the durable storage
//! contract: constructing a hash from any other number of bytes is an error,
//! never a truncation.

#![warn(missing_docs)]

pub use error::WeaveHashError;
pub use hash::{Hash, HashDeserializer};
pub use settings::HASH_SIZE_BYTES;

mod error;
mod hash;
mod settings;
