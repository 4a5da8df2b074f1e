// Copyright (c) 2023 WEAVE LABS <dev@weave.network>

use rocksdb::{IteratorMode, Options, ReadOptions, WriteBatch, DB};
use weave_db_exports::{DBBatch, Key, StoreConfig, StoreController, StoreError, Value};

/// Wrapped RocksDB database implementing [`StoreController`].
pub struct WeaveDB {
    db: DB,
}

impl std::fmt::Debug for WeaveDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#?}", self.db)
    }
}

impl WeaveDB {
    /// Opens (creating if missing) the database at the configured path.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);

        let db = DB::open(&db_opts, &config.path)
            .map_err(|e| StoreError::RocksDbError(format!("{:?}", e)))?;

        Ok(WeaveDB { db })
    }
}

impl StoreController for WeaveDB {
    fn get(&self, key: &[u8]) -> Result<Option<Value>, StoreError> {
        self.db
            .get(key)
            .map_err(|e| StoreError::RocksDbError(format!("{:?}", e)))
    }

    fn prefix_iterator<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = Result<(Key, Value), StoreError>> + 'a> {
        let mut opt = ReadOptions::default();
        match end_prefix(prefix) {
            Some(end) => opt.set_iterate_range(prefix.to_vec()..end),
            None => opt.set_iterate_lower_bound(prefix.to_vec()),
        }

        Box::new(self.db.iterator_opt(IteratorMode::Start, opt).map(|res| {
            res.map(|(key, value)| (key.to_vec(), value.to_vec()))
                .map_err(|e| StoreError::RocksDbError(format!("{:?}", e)))
        }))
    }

    fn write_batch(&self, batch: DBBatch) -> Result<(), StoreError> {
        let mut write_batch = WriteBatch::default();
        for (key, op) in batch {
            match op {
                Some(value) => write_batch.put(&key, &value),
                None => write_batch.delete(&key),
            }
        }
        self.db
            .write(write_batch)
            .map_err(|e| StoreError::RocksDbError(format!("{:?}", e)))
    }
}

/// For a given start prefix (inclusive), returns the correct end prefix (non-inclusive).
/// This assumes the key bytes are ordered in lexicographical order.
/// Since key length is not limited, for some case we return `None` because there is
/// no bounded limit (every keys in the series `[]`, `[255]`, `[255, 255]` ...).
fn end_prefix(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end_range = prefix.to_vec();
    while let Some(0xff) = end_range.last() {
        end_range.pop();
    }
    if let Some(byte) = end_range.last_mut() {
        *byte += 1;
        Some(end_range)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_test_db() -> (WeaveDB, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = WeaveDB::new(StoreConfig {
            path: temp_dir.path().to_path_buf(),
        })
        .unwrap();
        (db, temp_dir)
    }

    #[test]
    fn test_end_prefix() {
        assert_eq!(end_prefix(&[5, 6, 7]), Some(vec![5, 6, 8]));
        assert_eq!(end_prefix(&[5, 6, 255]), Some(vec![5, 7]));
        assert_eq!(end_prefix(&[255, 255]), None);
    }

    #[test]
    fn test_batch_set_get_delete() {
        let (db, _temp) = init_test_db();

        let mut batch = DBBatch::new();
        batch.insert(b"k1".to_vec(), Some(b"v1".to_vec()));
        batch.insert(b"k2".to_vec(), Some(b"v2".to_vec()));
        db.write_batch(batch).unwrap();

        assert_eq!(db.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(db.get(b"k2").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(db.get(b"k3").unwrap(), None);

        let mut batch = DBBatch::new();
        batch.insert(b"k1".to_vec(), None);
        db.write_batch(batch).unwrap();
        assert_eq!(db.get(b"k1").unwrap(), None);
    }

    #[test]
    fn test_prefix_iteration_is_bounded_and_ordered() {
        let (db, _temp) = init_test_db();

        let mut batch = DBBatch::new();
        batch.insert(b"a/2".to_vec(), Some(vec![2]));
        batch.insert(b"a/1".to_vec(), Some(vec![1]));
        batch.insert(b"b/1".to_vec(), Some(vec![3]));
        db.write_batch(batch).unwrap();

        let entries: Vec<(Key, Value)> = db
            .prefix_iterator(b"a/")
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            entries,
            vec![
                (b"a/1".to_vec(), vec![1]),
                (b"a/2".to_vec(), vec![2]),
            ]
        );
    }
}
