//! Key-value blob storage for persisted editor state.
//!
//! The catalog only needs "read the record named K" and "overwrite the record named K",
//! so that is all [`BlobStore`] offers. [`FileStore`] keeps one JSON file per key;
//! [`MemoryStore`] backs tests and sessions that run without a writable disk.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub trait BlobStore {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace whatever is stored under `key`.
    fn put(&self, key: &str, value: &str) -> io::Result<()>;
}

// ============================================================================
// FileStore
// ============================================================================

/// One `<key>.json` file per key inside `root`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform default: `<data_dir>/pixelboard`.
    ///
    /// - Linux:   `~/.local/share/pixelboard`
    /// - macOS:   `~/Library/Application Support/pixelboard`
    /// - Windows: `%APPDATA%\pixelboard`
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pixelboard")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are simple identifiers; strip anything that could escape the root.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Write to a temporary sibling, then rename over the old record.
    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.root)?;
        let final_path = self.path_for(key);
        let tmp_path = final_path.with_extension("json.tmp");

        fs::write(&tmp_path, value)?;
        match fs::rename(&tmp_path, &final_path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                if final_path.exists() {
                    fs::remove_file(&final_path)?;
                    fs::rename(&tmp_path, &final_path)
                } else {
                    Err(rename_err)
                }
            }
        }
    }
}

// ============================================================================
// MemoryStore
// ============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.records.borrow().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> io::Result<()> {
        self.records
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
