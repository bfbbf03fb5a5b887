//! JSON file helpers shared by projects and the script library.

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("settings error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("no configuration directory available")]
    NoConfigDir,
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Writes `value` as pretty JSON, creating parent directories.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_owned(),
        source,
    })?;
    write_text(path, &json)
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    let io = |source| StoreError::Io {
        path: path.to_owned(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io)?;
    }
    std::fs::write(path, text).map_err(io)
}

/// Per-user data directory for this application.
pub(crate) fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tora-gui-builder"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_json_round_trip_creates_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("value.json");
        write_json(&path, &vec!["a", "b"]).unwrap();
        let back: Vec<String> = read_json(&path).unwrap();
        assert_eq!(back, vec!["a", "b"]);
    }

    #[test]
    fn test_errors_name_the_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.json");
        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));

        let bad = temp.path().join("bad.json");
        write_text(&bad, "{ not json").unwrap();
        let err = read_json::<Vec<String>>(&bad).unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }
}
