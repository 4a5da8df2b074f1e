// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use displaydoc::Display;
use thiserror::Error;

/// Models error
#[non_exhaustive]
#[derive(Display, Error, Debug)]
pub enum ModelsError {
    /// hash error: {0}
    HashError(#[from] weave_hash::WeaveHashError),
}
