use crate::store::{self, StoreError};
use crate::widget::{File, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk form of the open tabs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Project {
    pub(crate) files: Vec<File>,
    #[serde(default)]
    pub(crate) active_file: Option<String>,
}

impl Project {
    pub fn from_snapshot(snapshot: &Snapshot, active_file: &str) -> Self {
        Self {
            files: snapshot.files().to_vec(),
            active_file: Some(active_file.to_owned()),
        }
    }

    /// `None` for a project without files.
    pub fn into_snapshot(self) -> Option<(Snapshot, Option<String>)> {
        Some((Snapshot::new(self.files)?, self.active_file))
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        store::write_json(path, self)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        store::read_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use crate::widget::ElementType;

    #[test]
    fn test_save_and_load() {
        let mut file = File::default();
        file.data.folders[0]
            .elements
            .push(ElementType::Slider.default_element());
        let snapshot = Snapshot::new(vec![file, File::untitled()]).unwrap();
        let project = Project::from_snapshot(&snapshot, "1");

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.json");
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded, project);

        let (back, active) = loaded.into_snapshot().unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(active.as_deref(), Some("1"));
    }

    #[test]
    fn test_active_file_is_optional() {
        let json = r#"{"files":[{"id":"a","name":"a.lua","data":{"title":"A","folders":[]}}]}"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.active_file, None);
        assert_eq!(project.files[0].data.title, "A");

        let empty: Project = serde_json::from_str(r#"{"files":[]}"#).unwrap();
        assert!(empty.into_snapshot().is_none());
    }
}
