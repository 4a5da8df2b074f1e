use std::path::PathBuf;

/// Config structure for a `WeaveDB`
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// The path to the database directory
    pub path: PathBuf,
}
