use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns a fresh opaque identifier for files, folders and elements.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Short random suffix used when inventing default flags.
fn flag_suffix() -> String {
    let id = new_id();
    id[..8].to_owned()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum ElementType {
    Button,
    Toggle,
    Slider,
    Dropdown,
}

impl ElementType {
    pub(crate) const ALL: [ElementType; 4] = [
        ElementType::Button,
        ElementType::Toggle,
        ElementType::Slider,
        ElementType::Dropdown,
    ];

    pub const fn display_name(&self) -> &'static str {
        match self {
            ElementType::Button => "Button",
            ElementType::Toggle => "Toggle",
            ElementType::Slider => "Slider",
            ElementType::Dropdown => "Dropdown",
        }
    }

    /// Builds a new element of this type with the editor defaults.
    /// Flags get a random suffix so freshly added widgets do not collide.
    pub fn default_element(&self) -> Element {
        let kind = match self {
            ElementType::Button => ElementKind::Button,
            ElementType::Toggle => ElementKind::Toggle {
                flag: format!("toggle_{}", flag_suffix()),
                default_state: false,
            },
            ElementType::Slider => ElementKind::Slider {
                flag: format!("slider_{}", flag_suffix()),
                min: 0.0,
                max: 100.0,
                value: 50.0,
                decimals: 0,
            },
            ElementType::Dropdown => ElementKind::Dropdown {
                flag: format!("dropdown_{}", flag_suffix()),
                values: vec!["Option 1".into(), "Option 2".into()],
            },
        };
        Element {
            id: new_id(),
            text: self.display_name().to_owned(),
            custom_logic: None,
            kind,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Splits a comma separated option list as typed in the inspector.
pub(crate) fn parse_options(text: &str) -> Vec<String> {
    text.split(',').map(|s| s.trim().to_owned()).collect()
}

/// Variant-specific configuration of an element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ElementKind {
    Button,
    #[serde(rename_all = "camelCase")]
    Toggle { flag: String, default_state: bool },
    Slider {
        flag: String,
        min: f64,
        max: f64,
        value: f64,
        decimals: u32,
    },
    Dropdown { flag: String, values: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Element {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) custom_logic: Option<String>,
    #[serde(flatten)]
    pub(crate) kind: ElementKind,
}

impl Element {
    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Button => ElementType::Button,
            ElementKind::Toggle { .. } => ElementType::Toggle,
            ElementKind::Slider { .. } => ElementType::Slider,
            ElementKind::Dropdown { .. } => ElementType::Dropdown,
        }
    }

    pub fn flag(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Button => None,
            ElementKind::Toggle { flag, .. }
            | ElementKind::Slider { flag, .. }
            | ElementKind::Dropdown { flag, .. } => Some(flag),
        }
    }

    /// The user logic, unless it is absent or empty.
    pub fn logic(&self) -> Option<&str> {
        self.custom_logic
            .as_deref()
            .filter(|logic| !logic.is_empty())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Folder {
    pub(crate) id: String,
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) elements: Vec<Element>,
}

impl Folder {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            elements: Vec::new(),
        }
    }
}

/// The root of a widget tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct Window {
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) folders: Vec<Folder>,
}

impl Default for Window {
    fn default() -> Self {
        Self {
            title: "Tora GUI".into(),
            folders: vec![Folder {
                id: "f-1".into(),
                text: "Main Tab".into(),
                elements: Vec::new(),
            }],
        }
    }
}

impl Window {
    /// Template used for tabs opened with "New File".
    pub fn untitled() -> Self {
        Self {
            title: "New Script".into(),
            folders: vec![Folder::new("Main Tab")],
        }
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.folders
            .iter()
            .flat_map(|f| f.elements.iter())
            .find(|e| e.id == id)
    }

    pub fn folder(&self, id: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    /// The folder holding the given element.
    pub fn folder_of(&self, element_id: &str) -> Option<&Folder> {
        self.folders
            .iter()
            .find(|f| f.elements.iter().any(|e| e.id == element_id))
    }

    pub fn element_count(&self) -> usize {
        self.folders.iter().map(|f| f.elements.len()).sum()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct File {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) data: Window,
}

impl Default for File {
    fn default() -> Self {
        Self {
            id: "1".into(),
            name: "script.lua".into(),
            data: Window::default(),
        }
    }
}

impl File {
    pub fn untitled() -> Self {
        Self {
            id: new_id(),
            name: "untitled.lua".into(),
            data: Window::untitled(),
        }
    }
}

/// The full set of open files at one point in time. Never empty.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Snapshot {
    files: Vec<File>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            files: vec![File::default()],
        }
    }
}

impl Snapshot {
    /// `None` when `files` is empty.
    pub fn new(files: Vec<File>) -> Option<Self> {
        (!files.is_empty()).then_some(Self { files })
    }

    pub fn files(&self) -> &[File] {
        &self.files
    }

    pub fn first(&self) -> &File {
        &self.files[0]
    }

    pub fn file(&self, id: &str) -> Option<&File> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.file(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns a copy with the matching file swapped for `file`.
    pub fn with_file(&self, file: File) -> Self {
        let files = self
            .files
            .iter()
            .map(|f| if f.id == file.id { file.clone() } else { f.clone() })
            .collect();
        Self { files }
    }

    pub fn with_appended(&self, file: File) -> Self {
        let mut files = self.files.clone();
        files.push(file);
        Self { files }
    }

    /// Returns a copy without the file `id`, or `None` if that would
    /// leave no files.
    pub fn without(&self, id: &str) -> Option<Self> {
        let files = self.files.iter().filter(|f| f.id != id).cloned().collect();
        Self::new(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        assert_eq!(parse_options("Easy, Hard ,Insane"), ["Easy", "Hard", "Insane"]);
        assert_eq!(parse_options("Solo"), ["Solo"]);
        assert_eq!(parse_options("A,"), ["A", ""]);
    }

    #[test]
    fn test_default_elements() {
        for ty in ElementType::ALL {
            let element = ty.default_element();
            assert_eq!(element.element_type(), ty);
            assert_eq!(element.text, ty.display_name());
            assert!(element.custom_logic.is_none());
        }

        let ElementKind::Slider {
            min, max, value, ..
        } = ElementType::Slider.default_element().kind
        else {
            panic!("slider expected");
        };
        assert!(min <= value && value <= max);
    }

    #[test]
    fn test_default_flags_are_distinct() {
        let a = ElementType::Toggle.default_element();
        let b = ElementType::Toggle.default_element();
        assert!(a.flag().unwrap().starts_with("toggle_"));
        assert_ne!(a.flag(), b.flag());
        assert_ne!(a.id, b.id);
        assert_eq!(ElementType::Button.default_element().flag(), None);
    }

    #[test]
    fn test_empty_logic_is_ignored() {
        let mut element = ElementType::Button.default_element();
        assert_eq!(element.logic(), None);
        element.custom_logic = Some(String::new());
        assert_eq!(element.logic(), None);
        element.custom_logic = Some("  \n\t".into());
        assert_eq!(element.logic(), Some("  \n\t"));
        element.custom_logic = Some("print(1)".into());
        assert_eq!(element.logic(), Some("print(1)"));
    }

    #[test]
    fn test_element_json_shape() {
        let json = r#"{
            "id": "e1",
            "type": "Toggle",
            "text": "Fly",
            "flag": "fly",
            "defaultState": true,
            "customLogic": "print(state)"
        }"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.text, "Fly");
        assert_eq!(element.logic(), Some("print(state)"));
        assert_eq!(
            element.kind,
            ElementKind::Toggle {
                flag: "fly".into(),
                default_state: true
            }
        );

        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "Toggle");
        assert_eq!(value["defaultState"], true);
        assert_eq!(value["customLogic"], "print(state)");
    }

    #[test]
    fn test_slider_accepts_integer_json() {
        let json = r#"{"id":"s","type":"Slider","text":"Speed","flag":"speed","min":0,"max":100,"value":16,"decimals":0}"#;
        let element: Element = serde_json::from_str(json).unwrap();
        assert!(matches!(element.kind, ElementKind::Slider { value, .. } if value == 16.0));
    }

    #[test]
    fn test_window_lookups() {
        let mut window = Window::default();
        let element = ElementType::Button.default_element();
        let id = element.id.clone();
        window.folders[0].elements.push(element);

        assert_eq!(window.element(&id).map(|e| e.text.as_str()), Some("Button"));
        assert_eq!(window.folder_of(&id).map(|f| f.id.as_str()), Some("f-1"));
        assert!(window.folder("missing").is_none());
        assert_eq!(window.element_count(), 1);
    }

    #[test]
    fn test_snapshot_edits_do_not_touch_original() {
        let original = Snapshot::default();
        let extra = File::untitled();
        let grown = original.with_appended(extra.clone());
        assert_eq!(original.len(), 1);
        assert_eq!(grown.len(), 2);

        let mut renamed = extra.clone();
        renamed.name = "other.lua".into();
        let changed = grown.with_file(renamed);
        assert_eq!(grown.file(&extra.id).unwrap().name, "untitled.lua");
        assert_eq!(changed.file(&extra.id).unwrap().name, "other.lua");

        let shrunk = changed.without(&extra.id).unwrap();
        assert!(!shrunk.contains(&extra.id));
        assert_eq!(shrunk, original);
        assert_eq!(shrunk.without("1"), None);
    }

    #[test]
    fn test_snapshot_is_never_empty() {
        assert_eq!(Snapshot::new(vec![]), None);
        let snapshot = Snapshot::new(vec![File::untitled(), File::default()]).unwrap();
        assert_eq!(snapshot.first().name, "untitled.lua");
        assert_eq!(Snapshot::default().first().id, "1");
    }
}
