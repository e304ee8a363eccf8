//! Local key-value storage
//!
//! A small `getItem` / `setItem` style store holding string values under
//! string keys. The file-backed store keeps every key in a single JSON
//! document on disk; the in-memory one is used by tests and dry runs.
//!
//! Writers of the file store hold an OS lock on a sibling `.lock` file, so
//! separate processes sharing one data directory never interleave their
//! read-modify-write cycles.

use fd_lock::RwLock as FileLock;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::models::{AppError, AppResult};
use crate::utils::file_utils::{ensure_dir_exists, write_atomic};

/// Default file name of the on-disk store
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Computes the new value of a key from its current one
pub type Update<'a> = Box<dyn FnOnce(Option<String>) -> AppResult<String> + 'a>;

pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;
    fn remove_item(&self, key: &str) -> AppResult<()>;

    /// Replace the value under `key` with `update(current)`. No other writer
    /// can change the key between the read and the write. When `update`
    /// fails nothing is written.
    fn update_item(&self, key: &str, update: Update<'_>) -> AppResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        (**self).remove_item(key)
    }

    fn update_item(&self, key: &str, update: Update<'_>) -> AppResult<()> {
        (**self).update_item(key, update)
    }
}

#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.items.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn update_item(&self, key: &str, update: Update<'_>) -> AppResult<()> {
        let mut items = self.items.lock();
        let value = update(items.get(key).cloned())?;
        items.insert(key.to_string(), value);
        Ok(())
    }
}

/// 基于单个 JSON 文件的存储，每次读取都直接访问磁盘
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store located at `<dir>/storage.json`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORAGE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        self.path.with_extension("lock")
    }

    /// Run `f` holding both the in-process lock and the OS lock on the
    /// sibling lock file. Blocks until other holders release it.
    fn exclusive<T>(&self, f: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        let _guard = self.lock.lock();

        if let Some(parent) = self.path.parent() {
            ensure_dir_exists(parent).map_err(|e| AppError::Storage(format!("{:#}", e)))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        let mut file_lock = FileLock::new(file);
        let _held = file_lock.write()?;

        f()
    }

    fn read_all(&self) -> AppResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            AppError::Storage(format!("Corrupt storage file {:?}: {}", self.path, e))
        })
    }

    fn write_all(&self, items: &HashMap<String, String>) -> AppResult<()> {
        let content = serde_json::to_vec_pretty(items)?;
        write_atomic(&self.path, &content).map_err(|e| AppError::Storage(format!("{:#}", e)))?;
        debug!("Wrote {} key(s) to {:?}", items.len(), self.path);
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    // 写入通过 rename 完成，读取无需加锁
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.exclusive(|| {
            let mut items = self.read_all()?;
            items.insert(key.to_string(), value.to_string());
            self.write_all(&items)
        })
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.exclusive(|| {
            let mut items = self.read_all()?;
            if items.remove(key).is_some() {
                self.write_all(&items)?;
            }
            Ok(())
        })
    }

    fn update_item(&self, key: &str, update: Update<'_>) -> AppResult<()> {
        self.exclusive(|| {
            let mut items = self.read_all()?;
            let value = update(items.remove(key))?;
            items.insert(key.to_string(), value);
            self.write_all(&items)
        })
    }
}
