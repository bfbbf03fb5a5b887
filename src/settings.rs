use crate::codegen::{DEFAULT_LIBRARY_LOADER, GeneratorOptions};
use crate::history::DEFAULT_CAPACITY;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct EditorSettings {
    /// Snapshots kept for undo
    pub(crate) history_capacity: usize,
    pub(crate) syntax_highlighting: bool,
    /// Regenerate the code view on every edit
    pub(crate) auto_generate: bool,
    pub(crate) include_header: bool,
    /// Lua expression bound to `library` in generated scripts
    pub(crate) library_loader: String,
    pub(crate) open_console_on_error: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            syntax_highlighting: true,
            auto_generate: true,
            include_header: true,
            library_loader: DEFAULT_LIBRARY_LOADER.to_owned(),
            open_console_on_error: true,
        }
    }
}

impl EditorSettings {
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tora-gui-builder").join("settings.toml"))
    }

    /// Load settings from the config directory, or defaults if absent.
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| match toml::from_str(&content) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    log::warn!("invalid settings in {}: {e}", path.display());
                    None
                }
            })
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        let path = Self::settings_path().ok_or(StoreError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(self)?;
        crate::store::write_text(path, &content)
    }

    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            include_header: self.include_header,
            library_loader: self.library_loader.clone(),
        }
    }
}
