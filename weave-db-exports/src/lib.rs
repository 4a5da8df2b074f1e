//! Contract of the ordered key-value store underlying the confirmed-state
//! engine: point lookups, ascending prefix iteration and atomic batched
//! writes. The engine only ever talks to [`StoreController`]; the RocksDB
//! implementation lives in `weave_db_worker`.

mod batch;
mod controller;
mod error;
mod settings;

pub use batch::*;
pub use controller::*;
pub use error::*;
pub use settings::*;
