use std::path::Path;

use chrono::{DateTime, Utc};

use crate::canvas::Grid;
use crate::catalog::{SavedWork, WorkCatalog};
use crate::components::colors::Color;
use crate::components::tools::{BrushSize, Shortcut, Tool, erase_stroke, paint_stroke};
use crate::error::{Error, Result};
use crate::io::{self, SharedArt};
use crate::ops::patterns::{self, Pattern};
use crate::settings::AppSettings;
use crate::storage::BlobStore;
use crate::{log_err, log_info};

/// The open board: one grid plus the tool state and the catalog it saves into.
pub struct Session {
    grid: Grid,
    tool: Tool,
    color: Color,
    brush: BrushSize,
    catalog: WorkCatalog,
    /// `None` once persistence has failed, or for an in-memory session.
    store: Option<Box<dyn BlobStore>>,
    settings: AppSettings,

    /// Display name (last saved or loaded work, or "Untitled")
    pub name: String,
    pub is_dirty: bool,
}

impl Session {
    /// Start a session backed by `store`. The catalog is read immediately.
    pub fn new(settings: AppSettings, store: Box<dyn BlobStore>) -> Result<Self> {
        let catalog = WorkCatalog::load(store.as_ref(), &settings.catalog_key);
        Self::build(settings, catalog, Some(store))
    }

    /// A session that never touches storage.
    pub fn in_memory(settings: AppSettings) -> Result<Self> {
        Self::build(settings, WorkCatalog::new(), None)
    }

    fn build(
        settings: AppSettings,
        catalog: WorkCatalog,
        store: Option<Box<dyn BlobStore>>,
    ) -> Result<Self> {
        Ok(Self {
            grid: Grid::new(settings.default_grid_size)?,
            tool: Tool::default(),
            color: settings.default_color.clone(),
            brush: settings.default_brush,
            catalog,
            store,
            settings,
            name: "Untitled".to_string(),
            is_dirty: false,
        })
    }

    // ---- state --------------------------------------------------------------

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn brush(&self) -> BrushSize {
        self.brush
    }

    pub fn catalog(&self) -> &WorkCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    /// False when saves only live in memory.
    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_brush(&mut self, brush: BrushSize) {
        self.brush = brush;
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        let size = self.grid.size();
        if self.is_dirty {
            format!("{}* ({}x{})", self.name, size, size)
        } else {
            format!("{} ({}x{})", self.name, size, size)
        }
    }

    // ---- editing ------------------------------------------------------------

    /// Apply the current tool at `(x, y)`. Returns the number of cells affected.
    pub fn press(&mut self, x: usize, y: usize) -> Result<usize> {
        let affected = match self.tool {
            Tool::Pencil => paint_stroke(&mut self.grid, (x, y), self.brush, &self.color)?,
            Tool::Eraser => erase_stroke(&mut self.grid, (x, y), self.brush)?,
            Tool::Fill => {
                self.grid.index_of(x, y)?;
                patterns::fill(&mut self.grid, &self.color)
            }
        };
        self.mark_dirty();
        Ok(affected)
    }

    /// Flood the whole board with the current color. Returns cells newly painted.
    pub fn fill(&mut self) -> usize {
        let painted = patterns::fill(&mut self.grid, &self.color);
        self.mark_dirty();
        painted
    }

    /// Replace the board with an empty `size × size` grid.
    pub fn resize(&mut self, size: usize) -> Result<()> {
        self.grid = Grid::new(size)?;
        self.mark_dirty();
        Ok(())
    }

    /// Empty every cell. Returns how many were painted.
    pub fn clear(&mut self) -> usize {
        let cleared = self.grid.clear();
        self.mark_dirty();
        cleared
    }

    /// Replace the board content with a preset. The current color is left alone.
    pub fn apply_preset(&mut self, pattern: Pattern) -> Result<usize> {
        let painted = patterns::apply_preset(&mut self.grid, pattern)?;
        self.mark_dirty();
        Ok(painted)
    }

    /// Run the action bound to `key`, if any.
    pub fn handle_key(&mut self, key: char) -> Option<Shortcut> {
        let shortcut = Shortcut::from_key(key)?;
        match shortcut {
            Shortcut::Brush(brush) => self.set_brush(brush),
            Shortcut::Clear => {
                self.clear();
            }
            Shortcut::SelectTool(tool) => self.set_tool(tool),
        }
        Some(shortcut)
    }

    // ---- catalog ------------------------------------------------------------

    /// Name offered when the user saves without typing one.
    pub fn default_work_name(now: DateTime<Utc>) -> String {
        format!("Pixel Art {}", now.format("%Y-%m-%d"))
    }

    /// Snapshot the board into the catalog and persist it.
    ///
    /// A storage failure is logged and the session continues in memory only; the
    /// work is still in the catalog and is returned.
    pub fn save_work(&mut self, name: &str, now: DateTime<Utc>) -> Result<SavedWork> {
        let id = self.catalog.next_id(now);
        let work = io::to_record(&self.grid, name, id, now)?;
        self.catalog.add(work.clone())?;
        self.persist();

        log_info!("Saved work '{}' (id {})", work.name, work.id);
        self.name = work.name.clone();
        self.mark_clean();
        Ok(work)
    }

    fn persist(&mut self) {
        let Some(store) = self.store.as_deref() else { return };
        if let Err(e) = self.catalog.save(store, &self.settings.catalog_key) {
            log_err!("Could not persist catalog, keeping works in memory: {}", e);
            self.store = None;
        }
    }

    /// Replace the board with a saved work.
    pub fn load_work(&mut self, id: u64) -> Result<&SavedWork> {
        let work = self.catalog.find_by_id(id)?;
        self.grid = work.to_grid()?;
        self.name = work.name.clone();
        self.is_dirty = false;
        Ok(work)
    }

    /// Same as [`Session::load_work`], by 1-based catalog position.
    pub fn load_work_at(&mut self, position: usize) -> Result<&SavedWork> {
        let id = self
            .catalog
            .get_position(position)
            .map(|w| w.id)
            .ok_or(Error::NoSuchPosition(position))?;
        self.load_work(id)
    }

    // ---- sharing & export ---------------------------------------------------

    pub fn share_token(&self, now: DateTime<Utc>) -> Result<String> {
        io::to_share_token(&self.grid, now)
    }

    pub fn share_url(&self, now: DateTime<Utc>) -> Result<String> {
        let token = self.share_token(now)?;
        io::share_url(&self.settings.share_base_url, &token)
    }

    /// Replace the board with shared art. On failure the board is unchanged.
    pub fn open_share_token(&mut self, token: &str) -> Result<SharedArt> {
        let art = io::from_share_token(token)?;
        self.grid = art.to_grid()?;
        self.name = "Shared art".to_string();
        self.mark_dirty();
        log_info!("Opened shared {}x{} art", art.grid_size, art.grid_size);
        Ok(art)
    }

    pub fn open_share_url(&mut self, url: &str) -> Result<SharedArt> {
        let token = io::token_from_url(url)?;
        self.open_share_token(&token)
    }

    /// PNG export at the configured scale.
    pub fn export_png(&self, path: &Path) -> Result<()> {
        self.export_png_scaled(path, self.settings.export_scale)
    }

    pub fn export_png_scaled(&self, path: &Path, cell_px: u32) -> Result<()> {
        io::export_png(&self.grid, cell_px, path)?;
        log_info!("Exported {} at {}px per cell", path.display(), cell_px);
        Ok(())
    }
}
