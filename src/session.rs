//! Editing operations on the open files.
//!
//! Every successful operation builds a new [`Snapshot`] and pushes it onto
//! the [`History`]; a failed one leaves both untouched.

use crate::history::{History, lineage::VersionRecord};
use crate::widget::{Element, ElementKind, ElementType, File, Folder, Snapshot, Window};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("file not found: {id}")]
    UnknownFile { id: String },

    #[error("tab not found: {id}")]
    UnknownFolder { id: String },

    #[error("element not found: {id}")]
    UnknownElement { id: String },

    #[error("{field} does not apply to a {element_type}")]
    NotApplicable {
        field: &'static str,
        element_type: ElementType,
    },

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("file name must not be empty")]
    EmptyName,

    #[error("cannot delete the last tab")]
    LastFolder,

    #[error("cannot close the last file")]
    LastFile,
}

/// Rejects a window holding a slider number that is NaN or infinite.
fn check_finite(window: &Window) -> Result<()> {
    for element in window.folders.iter().flat_map(|f| &f.elements) {
        if let ElementKind::Slider { min, max, value, .. } = &element.kind {
            for (field, n) in [("min", *min), ("max", *max), ("value", *value)] {
                if !n.is_finite() {
                    return Err(EditError::NonFinite { field, value: n });
                }
            }
        }
    }
    Ok(())
}

/// A single-field change to an element.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ElementPatch {
    Text(String),
    CustomLogic(Option<String>),
    Flag(String),
    DefaultState(bool),
    Min(f64),
    Max(f64),
    Value(f64),
    Decimals(u32),
    Values(Vec<String>),
}

impl ElementPatch {
    fn field(&self) -> &'static str {
        match self {
            ElementPatch::Text(_) => "text",
            ElementPatch::CustomLogic(_) => "customLogic",
            ElementPatch::Flag(_) => "flag",
            ElementPatch::DefaultState(_) => "defaultState",
            ElementPatch::Min(_) => "min",
            ElementPatch::Max(_) => "max",
            ElementPatch::Value(_) => "value",
            ElementPatch::Decimals(_) => "decimals",
            ElementPatch::Values(_) => "values",
        }
    }

    /// Applies the patch to a copy of `element`.
    fn apply(self, element: &Element) -> Result<Element> {
        let field = self.field();
        if let ElementPatch::Min(n) | ElementPatch::Max(n) | ElementPatch::Value(n) = &self
            && !n.is_finite()
        {
            return Err(EditError::NonFinite { field, value: *n });
        }

        let not_applicable = || EditError::NotApplicable {
            field,
            element_type: element.element_type(),
        };

        let mut next = element.clone();
        match (self, &mut next.kind) {
            (ElementPatch::Text(text), _) => next.text = text,
            (ElementPatch::CustomLogic(logic), _) => next.custom_logic = logic,
            (
                ElementPatch::Flag(new_flag),
                ElementKind::Toggle { flag, .. }
                | ElementKind::Slider { flag, .. }
                | ElementKind::Dropdown { flag, .. },
            ) => *flag = new_flag,
            (ElementPatch::DefaultState(state), ElementKind::Toggle { default_state, .. }) => {
                *default_state = state
            }
            (ElementPatch::Min(n), ElementKind::Slider { min, .. }) => *min = n,
            (ElementPatch::Max(n), ElementKind::Slider { max, .. }) => *max = n,
            (ElementPatch::Value(n), ElementKind::Slider { value, .. }) => *value = n,
            (ElementPatch::Decimals(n), ElementKind::Slider { decimals, .. }) => *decimals = n,
            (ElementPatch::Values(list), ElementKind::Dropdown { values, .. }) => *values = list,
            _ => return Err(not_applicable()),
        }
        Ok(next)
    }
}

/// A change to a folder.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum FolderPatch {
    Text(String),
}

/// A change to the window itself.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WindowPatch {
    Title(String),
}

/// The editing session: history plus which file is in front.
pub(crate) struct Session {
    history: History,
    active_file: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(History::default())
    }
}

impl Session {
    pub fn new(history: History) -> Self {
        let active_file = history.current().first().id.clone();
        Self {
            history,
            active_file,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn snapshot(&self) -> &Snapshot {
        self.history.current()
    }

    /// The file in front; falls back to the first open file when the active
    /// one is absent from the current snapshot (after an undo, say).
    pub fn active_file(&self) -> &File {
        let snapshot = self.history.current();
        snapshot
            .file(&self.active_file)
            .unwrap_or_else(|| snapshot.first())
    }

    pub fn active_file_id(&self) -> &str {
        &self.active_file().id
    }

    pub fn set_active_file(&mut self, id: &str) -> Result<()> {
        if !self.snapshot().contains(id) {
            return Err(EditError::UnknownFile { id: id.to_owned() });
        }
        self.active_file = id.to_owned();
        Ok(())
    }

    fn file(&self, id: &str) -> Result<&File> {
        self.snapshot()
            .file(id)
            .ok_or_else(|| EditError::UnknownFile { id: id.to_owned() })
    }

    /// Replaces the data of `file_id` and commits.
    fn commit_data(&mut self, file_id: &str, data: Window) -> Result<()> {
        check_finite(&data)?;
        let mut file = self.file(file_id)?.clone();
        file.data = data;
        let next = self.snapshot().with_file(file);
        self.history.push(next);
        Ok(())
    }

    fn active_window(&self) -> Window {
        self.active_file().data.clone()
    }

    pub fn add_folder(&mut self) -> Result<String> {
        let folder = Folder::new("New Tab");
        let id = folder.id.clone();
        let mut window = self.active_window();
        window.folders.push(folder);
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)?;
        log::debug!("added tab {id}");
        Ok(id)
    }

    pub fn add_element(&mut self, folder_id: &str, ty: ElementType) -> Result<String> {
        let mut window = self.active_window();
        let folder = window
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(|| EditError::UnknownFolder {
                id: folder_id.to_owned(),
            })?;
        let element = ty.default_element();
        let id = element.id.clone();
        folder.elements.push(element);
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)?;
        log::debug!("added {ty} {id} to tab {folder_id}");
        Ok(id)
    }

    pub fn delete_element(&mut self, element_id: &str) -> Result<()> {
        let mut window = self.active_window();
        let before = window.element_count();
        for folder in &mut window.folders {
            folder.elements.retain(|e| e.id != element_id);
        }
        if window.element_count() == before {
            return Err(EditError::UnknownElement {
                id: element_id.to_owned(),
            });
        }
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)
    }

    pub fn delete_folder(&mut self, folder_id: &str) -> Result<()> {
        let mut window = self.active_window();
        if window.folder(folder_id).is_none() {
            return Err(EditError::UnknownFolder {
                id: folder_id.to_owned(),
            });
        }
        if window.folders.len() <= 1 {
            return Err(EditError::LastFolder);
        }
        window.folders.retain(|f| f.id != folder_id);
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)
    }

    pub fn patch_element(&mut self, element_id: &str, patch: ElementPatch) -> Result<()> {
        let mut window = self.active_window();
        let slot = window
            .folders
            .iter_mut()
            .flat_map(|f| f.elements.iter_mut())
            .find(|e| e.id == element_id)
            .ok_or_else(|| EditError::UnknownElement {
                id: element_id.to_owned(),
            })?;
        *slot = patch.apply(slot)?;
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)
    }

    pub fn patch_folder(&mut self, folder_id: &str, patch: FolderPatch) -> Result<()> {
        let mut window = self.active_window();
        let folder = window
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id)
            .ok_or_else(|| EditError::UnknownFolder {
                id: folder_id.to_owned(),
            })?;
        match patch {
            FolderPatch::Text(text) => folder.text = text,
        }
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)
    }

    pub fn patch_window(&mut self, patch: WindowPatch) -> Result<()> {
        let mut window = self.active_window();
        match patch {
            WindowPatch::Title(title) => window.title = title,
        }
        let file_id = self.active_file_id().to_owned();
        self.commit_data(&file_id, window)
    }

    /// Renames a file. The name is stored as given but must not be blank.
    pub fn rename_file(&mut self, file_id: &str, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EditError::EmptyName);
        }
        let mut file = self.file(file_id)?.clone();
        file.name = name.to_owned();
        let next = self.snapshot().with_file(file);
        self.history.push(next);
        log::info!("renamed file {file_id} to {name}");
        Ok(())
    }

    /// Opens a fresh untitled file and makes it active.
    pub fn new_file(&mut self) -> String {
        self.open_file(File::untitled())
    }

    /// Opens a stored window in a new tab named after its title.
    pub fn open_window_as_file(&mut self, data: Window) -> Result<String> {
        check_finite(&data)?;
        let file = File {
            id: crate::widget::new_id(),
            name: format!("{}.lua", data.title),
            data,
        };
        Ok(self.open_file(file))
    }

    fn open_file(&mut self, file: File) -> String {
        let id = file.id.clone();
        let next = self.snapshot().with_appended(file);
        self.history.push(next);
        self.active_file = id.clone();
        id
    }

    pub fn close_file(&mut self, file_id: &str) -> Result<()> {
        self.file(file_id)?;
        let Some(next) = self.snapshot().without(file_id) else {
            return Err(EditError::LastFile);
        };
        if self.active_file_id() == file_id
            && let Some(last) = next.files().last()
        {
            self.active_file = last.id.clone();
        }
        self.history.push(next);
        Ok(())
    }

    /// Replaces a file's whole widget tree, as an externally proposed edit
    /// would. Goes through the same commit path as manual edits.
    pub fn replace_file_data(&mut self, file_id: &str, data: Window) -> Result<()> {
        self.commit_data(file_id, data)
    }

    /// Brings back an older version of a file as a new, undoable edit.
    pub fn restore_version(&mut self, version: &VersionRecord) -> Result<()> {
        let file = &version.file;
        self.file(&file.id)?;
        check_finite(&file.data)?;
        let next = self.snapshot().with_file(file.clone());
        self.history.push(next);
        log::info!("restored {} from snapshot {}", file.name, version.ordinal);
        Ok(())
    }

    /// Replaces the open files wholesale, e.g. after loading a project.
    pub fn replace_all(&mut self, snapshot: Snapshot) -> Result<()> {
        for file in snapshot.files() {
            check_finite(&file.data)?;
        }
        self.active_file = snapshot.first().id.clone();
        self.history.push(snapshot);
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo().is_some()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo().is_some()
    }
}
