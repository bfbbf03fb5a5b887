//! Saved scripts: a short list of windows the user stashed for later.

use crate::store::{self, StoreError};
use crate::widget::Window;
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of saved scripts kept; older ones fall off the end.
pub(crate) const MAX_SAVED: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct SavedScript {
    pub(crate) id: String,
    pub(crate) name: String,
    /// Milliseconds since the Unix epoch
    pub(crate) timestamp: i64,
    pub(crate) data: Window,
}

impl SavedScript {
    pub fn saved_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Newest-first list of saved scripts backed by a JSON file.
pub(crate) struct ScriptLibrary {
    scripts: Vec<SavedScript>,
    path: Option<PathBuf>,
}

impl ScriptLibrary {
    fn default_path() -> Option<PathBuf> {
        store::data_dir().map(|p| p.join("saved_scripts.json"))
    }

    /// Loads the library from the user data directory.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Loads from `path`; a missing or unreadable file gives an empty library.
    pub fn load_from(path: Option<PathBuf>) -> Self {
        let scripts = match path.as_deref() {
            Some(p) if p.exists() => store::read_json(p).unwrap_or_else(|e| {
                log::warn!("ignoring saved scripts: {e}");
                Vec::new()
            }),
            _ => Vec::new(),
        };
        Self { scripts, path }
    }

    pub fn scripts(&self) -> &[SavedScript] {
        &self.scripts
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Stores `data` at the front and persists the list.
    pub fn save(&mut self, name: &str, data: &Window) -> Result<(), StoreError> {
        let script = SavedScript {
            id: crate::widget::new_id(),
            name: name.to_owned(),
            timestamp: Local::now().timestamp_millis(),
            data: data.clone(),
        };
        self.scripts.insert(0, script);
        self.scripts.truncate(MAX_SAVED);
        self.persist()
    }

    pub fn remove(&mut self, id: &str) -> Result<(), StoreError> {
        self.scripts.retain(|s| s.id != id);
        self.persist()
    }

    fn persist(&self) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => store::write_json(path, &self.scripts),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn titled(title: &str) -> Window {
        Window {
            title: title.into(),
            ..Window::default()
        }
    }

    #[test]
    fn test_save_keeps_newest_first_and_caps() {
        let mut library = ScriptLibrary::load_from(None);
        for i in 0..MAX_SAVED + 2 {
            library.save(&format!("s{i}.lua"), &titled(&i.to_string())).unwrap();
        }
        assert_eq!(library.scripts().len(), MAX_SAVED);
        assert_eq!(library.scripts()[0].name, format!("s{}.lua", MAX_SAVED + 1));
        assert!(library.scripts()[0].saved_at().is_some());
    }

    #[test]
    fn test_persists_between_loads() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("saved_scripts.json");
        let mut library = ScriptLibrary::load_from(Some(path.clone()));
        assert!(library.scripts().is_empty());
        library.save("a.lua", &titled("A")).unwrap();
        library.save("b.lua", &titled("B")).unwrap();

        let mut reloaded = ScriptLibrary::load_from(Some(path.clone()));
        assert_eq!(reloaded.scripts(), library.scripts());

        let id = reloaded.scripts()[0].id.clone();
        reloaded.remove(&id).unwrap();
        let again = ScriptLibrary::load_from(Some(path.clone()));
        assert_eq!(again.scripts().len(), 1);
        assert_eq!(again.scripts()[0].data.title, "A");
    }

    #[test]
    fn test_corrupt_file_gives_empty_library() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("saved_scripts.json");
        store::write_text(&path, "garbage").unwrap();
        let library = ScriptLibrary::load_from(Some(path));
        assert!(library.scripts().is_empty());
    }
}
