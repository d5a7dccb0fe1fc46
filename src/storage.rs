//! Storage backends for economy snapshots using RocksDB

use crate::common::traits::StateStore;
use crate::config::{CompressionType, StorageConfig};
use crate::errors::{JackpotResult, StorageError};
use rocksdb::{Options, WriteBatch, DB};
use std::{
    collections::HashMap,
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, RwLock,
    },
};

#[derive(Clone)]
pub struct RocksStateStore {
    db: Arc<DB>,
}

impl RocksStateStore {
    /// Open (or create) a store with default tuning
    pub fn new<P: AsRef<Path>>(path: P) -> JackpotResult<Self> {
        Self::open(path, &StorageConfig::default())
    }

    /// Open (or create) a store tuned by `config`
    pub fn open<P: AsRef<Path>>(path: P, config: &StorageConfig) -> JackpotResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size_mb * 1024 * 1024);
        opts.set_compression_type(match config.compression_type {
            CompressionType::None => rocksdb::DBCompressionType::None,
            CompressionType::Snappy => rocksdb::DBCompressionType::Snappy,
            CompressionType::Lz4 => rocksdb::DBCompressionType::Lz4,
            CompressionType::Zstd => rocksdb::DBCompressionType::Zstd,
        });

        let db = DB::open(&opts, path.as_ref()).map_err(|e| {
            StorageError::DatabaseOpenFailed(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Ok(Self { db: Arc::new(db) })
    }
}

impl StateStore for RocksStateStore {
    fn load(&self, key: &str) -> JackpotResult<Option<Vec<u8>>> {
        self.db
            .get(key.as_bytes())
            .map_err(|e| StorageError::ReadFailed(format!("{}: {}", key, e)).into())
    }

    fn save(&self, key: &str, value: &[u8]) -> JackpotResult<()> {
        self.db
            .put(key.as_bytes(), value)
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", key, e)).into())
    }

    fn save_batch(&self, items: &[(String, Vec<u8>)]) -> JackpotResult<()> {
        let mut batch = WriteBatch::default();
        for (key, value) in items {
            batch.put(key.as_bytes(), value);
        }
        self.db
            .write(batch)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    fn delete(&self, key: &str) -> JackpotResult<()> {
        self.db
            .delete(key.as_bytes())
            .map_err(|e| StorageError::WriteFailed(format!("{}: {}", key, e)).into())
    }

    fn delete_batch(&self, keys: &[String]) -> JackpotResult<()> {
        let mut batch = WriteBatch::default();
        for key in keys {
            batch.delete(key.as_bytes());
        }
        self.db
            .write(batch)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }
}

/// Process-local store; optionally fails every write
#[derive(Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    fail_writes: AtomicBool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with `StorageError::WriteFailed`
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> JackpotResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            let error = StorageError::WriteFailed("memory store is read-only".to_string());
            return Err(error.into());
        }
        Ok(())
    }

    fn poisoned() -> StorageError {
        StorageError::CorruptedData("memory store lock poisoned".to_string())
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, key: &str) -> JackpotResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> JackpotResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn save_batch(&self, items: &[(String, Vec<u8>)]) -> JackpotResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for (key, value) in items {
            entries.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> JackpotResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn delete_batch(&self, keys: &[String]) -> JackpotResult<()> {
        self.check_writable()?;
        let mut entries = self.entries.write().map_err(|_| Self::poisoned())?;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }
}

/// Open the backend selected by `config`
pub fn open_store(config: &StorageConfig) -> JackpotResult<Arc<dyn StateStore>> {
    if config.in_memory {
        return Ok(Arc::new(MemoryStateStore::new()));
    }

    std::fs::create_dir_all(&config.data_directory)?;
    Ok(Arc::new(RocksStateStore::open(&config.data_directory, config)?))
}
