// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use std::collections::{HashMap, HashSet};
use std::hash::{BuildHasherDefault, Hasher};
use std::marker::PhantomData;

/// Marker for keys that are already the output of a cryptographic hash:
/// re-hashing them for bucketing is wasted work.
pub trait PreHashed {}

/// `Hasher` that just reads 8 bytes out of the written data.
pub struct HashMapper<T: PreHashed> {
    hash: u64,
    source: PhantomData<T>,
}

impl<T: PreHashed> Default for HashMapper<T> {
    fn default() -> Self {
        Self {
            hash: 0,
            source: PhantomData,
        }
    }
}

impl<T: PreHashed> Hasher for HashMapper<T> {
    fn finish(&self) -> u64 {
        self.hash
    }

    /// Keeps the first 8 bytes of the last write. Only sound for `PreHashed`
    /// keys, whose bytes are uniformly distributed.
    fn write(&mut self, bytes: &[u8]) {
        let mut buffer = [0u8; 8];
        let len = bytes.len().min(8);
        buffer[..len].copy_from_slice(&bytes[..len]);
        self.hash = u64::from_ne_bytes(buffer);
    }
}

/// `BuildHasher` for [`HashMapper`]
pub type BuildHashMapper<T> = BuildHasherDefault<HashMapper<T>>;

/// `HashMap` keyed by a [`PreHashed`] type
pub type PreHashMap<K, V> = HashMap<K, V, BuildHashMapper<K>>;

/// `HashSet` of a [`PreHashed`] type
pub type PreHashSet<T> = HashSet<T, BuildHashMapper<T>>;
