// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

/// Hash size
pub const HASH_SIZE_BYTES: usize = 32;
