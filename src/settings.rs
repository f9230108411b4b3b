use std::io;
use std::path::{Path, PathBuf};

use crate::catalog::DEFAULT_CATALOG_KEY;
use crate::components::colors::Color;
use crate::components::tools::BrushSize;
use crate::io::DEFAULT_EXPORT_SCALE;
use crate::storage::FileStore;

const SETTINGS_FILE: &str = "pixelboard_settings.cfg";

/// Editor settings that persist across sessions
#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    /// Grid size for a new board
    pub default_grid_size: usize,
    /// Initial pencil color
    pub default_color: Color,
    pub default_brush: BrushSize,
    /// Pixels per cell in PNG export
    pub export_scale: u32,
    /// How many works `list` shows when no limit is given
    pub gallery_size: usize,
    /// Side of the gallery preview, in cells
    pub thumbnail_size: usize,
    /// Catalog directory. `None` = platform data directory.
    pub storage_dir: Option<PathBuf>,
    /// Storage key the catalog lives under
    pub catalog_key: String,
    /// Page that share links point at
    pub share_base_url: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_grid_size: 16,
            default_color: Color::from_static("#FF0000"),
            default_brush: BrushSize::Medium,
            export_scale: DEFAULT_EXPORT_SCALE,
            gallery_size: 6,
            thumbnail_size: 8,
            storage_dir: None,
            catalog_key: DEFAULT_CATALOG_KEY.to_string(),
            share_base_url: "http://localhost:8080/index.html".to_string(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pixelboard/pixelboard_settings.cfg
    /// On Windows: %APPDATA%\pixelboard\pixelboard_settings.cfg
    /// On macOS:   ~/Library/Application Support/pixelboard/pixelboard_settings.cfg
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("pixelboard").join(SETTINGS_FILE))
    }

    /// Directory the catalog is stored in.
    pub fn storage_root(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(FileStore::default_root)
    }

    /// Save settings to the platform config directory
    pub fn save(&self) -> io::Result<()> {
        let Some(path) = Self::settings_path() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no config directory on this platform",
            ));
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Load settings from disk (returns default if file missing or corrupt)
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else { return Self::default() };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else { return Self::default() };
        Self::parse(&content)
    }

    /// Read `key=value` lines over the defaults. Unknown keys and bad values are skipped.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let Some((key, val)) = line.split_once('=') else { continue };
            let key = key.trim();
            let val = val.trim();
            match key {
                "default_grid_size" => {
                    if let Some(n) = val.parse().ok().filter(|&n: &usize| n > 0) {
                        s.default_grid_size = n;
                    }
                }
                "default_color" => {
                    if let Some(c) = Color::new(val) {
                        s.default_color = c;
                    }
                }
                "default_brush" => {
                    if let Some(b) = val.parse().ok().and_then(BrushSize::from_radius) {
                        s.default_brush = b;
                    }
                }
                "export_scale" => {
                    if let Some(n) = val.parse().ok().filter(|&n: &u32| n > 0) {
                        s.export_scale = n;
                    }
                }
                "gallery_size" => {
                    s.gallery_size = val.parse().unwrap_or(s.gallery_size);
                }
                "thumbnail_size" => {
                    if let Some(n) = val.parse().ok().filter(|&n: &usize| n > 0) {
                        s.thumbnail_size = n;
                    }
                }
                "storage_dir" => {
                    s.storage_dir = (!val.is_empty()).then(|| PathBuf::from(val));
                }
                "catalog_key" => {
                    if !val.is_empty() {
                        s.catalog_key = val.to_string();
                    }
                }
                "share_base_url" => {
                    if !val.is_empty() {
                        s.share_base_url = val.to_string();
                    }
                }
                _ => {}
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "default_grid_size={}\n\
             default_color={}\n\
             default_brush={}\n\
             export_scale={}\n\
             gallery_size={}\n\
             thumbnail_size={}\n\
             storage_dir={}\n\
             catalog_key={}\n\
             share_base_url={}\n",
            self.default_grid_size,
            self.default_color,
            self.default_brush.radius(),
            self.export_scale,
            self.gallery_size,
            self.thumbnail_size,
            self.storage_dir
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            self.catalog_key,
            self.share_base_url,
        )
    }
}
