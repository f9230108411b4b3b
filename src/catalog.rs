use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::canvas::{Grid, MAX_GRID_SIZE};
use crate::components::colors::{Color, cell_strings};
use crate::error::{Error, Result};
use crate::storage::BlobStore;
use crate::{log_info, log_warn};

/// Storage key the catalog is persisted under unless settings say otherwise.
pub const DEFAULT_CATALOG_KEY: &str = "pixelArtWorks";

/// Gallery preview fallback for empty cells.
const THUMBNAIL_BLANK: &str = "#FFFFFF";

// ============================================================================
// SAVED WORK
// ============================================================================

/// An immutable snapshot of a grid, as kept in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedWork {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub grid_size: usize,
    #[serde(with = "cell_strings")]
    pub cells: Vec<Option<Color>>,
    pub painted_count: usize,
}

impl SavedWork {
    /// A fresh grid holding this work's cells.
    pub fn to_grid(&self) -> Result<Grid> {
        Grid::from_cells(self.grid_size, self.cells.clone())
    }

    /// Nearest-neighbor `n × n` preview, row-major. Empty cells come back white.
    pub fn thumbnail(&self, n: usize) -> Vec<Color> {
        if n == 0 || self.grid_size == 0 {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(n * n);
        for y in 0..n {
            for x in 0..n {
                let sx = x * self.grid_size / n;
                let sy = y * self.grid_size / n;
                let cell = self
                    .cells
                    .get(sy * self.grid_size + sx)
                    .and_then(|c| c.clone());
                out.push(cell.unwrap_or_else(|| Color::from_static(THUMBNAIL_BLANK)));
            }
        }
        out
    }

    fn check_shape(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("empty name".into());
        }
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(format!("gridSize {} is out of range", self.grid_size));
        }
        match self.grid_size.checked_mul(self.grid_size) {
            Some(n) if n == self.cells.len() => Ok(()),
            _ => Err(format!(
                "{} cells for a {}x{} grid",
                self.cells.len(),
                self.grid_size,
                self.grid_size
            )),
        }
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Saved works in insertion order. Ids are unique.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkCatalog {
    works: Vec<SavedWork>,
}

impl WorkCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the catalog stored under `key`.
    ///
    /// Never fails: a missing record, an unreadable store or malformed JSON all give an
    /// empty catalog. Individual entries that are malformed or repeat an earlier id are
    /// dropped and the rest are kept.
    pub fn load(store: &dyn BlobStore, key: &str) -> Self {
        let raw = match store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                log_warn!("Could not read catalog '{}': {}", key, e);
                return Self::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log_warn!("Discarding malformed catalog '{}': {}", key, e);
                return Self::new();
            }
        };

        let mut catalog = Self::new();
        for (i, entry) in entries.into_iter().enumerate() {
            let work: SavedWork = match serde_json::from_value(entry) {
                Ok(w) => w,
                Err(e) => {
                    log_warn!("Skipping catalog entry {}: {}", i, e);
                    continue;
                }
            };
            if let Err(reason) = work.check_shape() {
                log_warn!("Skipping catalog entry {} (id {}): {}", i, work.id, reason);
                continue;
            }
            if let Err(e) = catalog.add(work) {
                log_warn!("Skipping catalog entry {}: {}", i, e);
            }
        }
        log_info!("Loaded {} saved work(s) from '{}'", catalog.len(), key);
        catalog
    }

    /// Overwrite the record under `key` with the whole catalog.
    pub fn save(&self, store: &dyn BlobStore, key: &str) -> Result<()> {
        let json = serde_json::to_string(&self.works)?;
        store.put(key, &json)?;
        Ok(())
    }

    pub fn add(&mut self, work: SavedWork) -> Result<()> {
        if self.works.iter().any(|w| w.id == work.id) {
            return Err(Error::DuplicateId(work.id));
        }
        self.works.push(work);
        Ok(())
    }

    /// The last `n` works, most recent first.
    pub fn recent(&self, n: usize) -> Vec<&SavedWork> {
        self.works.iter().rev().take(n).collect()
    }

    pub fn find_by_id(&self, id: u64) -> Result<&SavedWork> {
        self.works
            .iter()
            .find(|w| w.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// 1-based position in insertion order, as listed by `pixelboard list`.
    pub fn get_position(&self, position: usize) -> Option<&SavedWork> {
        position.checked_sub(1).and_then(|i| self.works.get(i))
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedWork> {
        self.works.iter()
    }

    /// Milliseconds since epoch, bumped past the highest id already in use.
    pub fn next_id(&self, now: DateTime<Utc>) -> u64 {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match self.works.iter().map(|w| w.id).max() {
            Some(last) if last >= millis => last.saturating_add(1),
            _ => millis,
        }
    }
}
