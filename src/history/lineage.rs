//! Per-file version lists derived from the undo history.

use super::History;
use crate::codegen::{GeneratorOptions, generate};
use crate::diff::{DiffLine, diff};
use crate::widget::File;
use chrono::{DateTime, Local};

/// One distinct state a file passed through.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct VersionRecord {
    /// Position of the originating snapshot in the history, oldest = 0
    pub(crate) ordinal: usize,
    pub(crate) committed_at: DateTime<Local>,
    pub(crate) file: File,
    pub(crate) is_latest: bool,
}

/// Lists the distinct versions of `file_id`, newest first.
///
/// Consecutive snapshots in which the file's data did not change collapse
/// into the first of them. Snapshots without the file are skipped.
pub(crate) fn lineage(history: &History, file_id: &str) -> Vec<VersionRecord> {
    let mut versions: Vec<VersionRecord> = Vec::new();

    for (ordinal, entry) in history.entries().enumerate() {
        let Some(file) = entry.snapshot.file(file_id) else {
            continue;
        };
        let unchanged = versions
            .last()
            .is_some_and(|last| last.file.data == file.data);
        if unchanged {
            continue;
        }
        versions.push(VersionRecord {
            ordinal,
            committed_at: entry.committed_at,
            file: file.clone(),
            is_latest: false,
        });
    }

    if let Some(last) = versions.last_mut() {
        last.is_latest = true;
    }
    versions.reverse();
    versions
}

/// Diff of version `index` against the version just before it.
///
/// The oldest version is compared with itself, giving an all-same script.
pub(crate) fn compare_with_previous(
    versions: &[VersionRecord],
    index: usize,
    options: &GeneratorOptions,
) -> Vec<DiffLine> {
    let Some(selected) = versions.get(index) else {
        return Vec::new();
    };
    let previous = versions.get(index + 1).unwrap_or(selected);
    diff(
        &generate(&previous.file.data, options),
        &generate(&selected.file.data, options),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{DiffKind, DiffStats};
    use crate::widget::{File, Snapshot, Window};

    fn snapshot(files: Vec<File>) -> Snapshot {
        Snapshot::new(files).unwrap()
    }

    fn file(id: &str, title: &str) -> File {
        File {
            id: id.into(),
            name: format!("{id}.lua"),
            data: Window {
                title: title.into(),
                ..Window::default()
            },
        }
    }

    #[test]
    fn test_unchanged_snapshot_is_deduplicated() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        history.push(snapshot(vec![file("x", "v1")]));
        history.push(snapshot(vec![file("x", "v2")]));

        let versions = lineage(&history, "x");
        assert_eq!(versions.len(), 2);
        assert!(versions[0].is_latest);
        assert!(!versions[1].is_latest);
        assert_eq!(versions[0].file.data.title, "v2");
        assert_eq!(versions[0].ordinal, 2);
        assert_eq!(versions[1].file.data.title, "v1");
        assert_eq!(versions[1].ordinal, 0);
    }

    #[test]
    fn test_edits_to_other_files_do_not_add_versions() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        history.push(snapshot(vec![file("x", "v1"), file("y", "a")]));
        history.push(snapshot(vec![file("x", "v1"), file("y", "b")]));

        assert_eq!(lineage(&history, "x").len(), 1);
        assert_eq!(lineage(&history, "y").len(), 2);
    }

    #[test]
    fn test_rename_alone_is_not_a_version() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        let mut renamed = file("x", "v1");
        renamed.name = "renamed.lua".into();
        history.push(snapshot(vec![renamed]));

        let versions = lineage(&history, "x");
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].file.name, "x.lua");
    }

    #[test]
    fn test_unknown_file_yields_nothing() {
        let history = History::new(snapshot(vec![file("x", "v1")]), 50);
        assert!(lineage(&history, "nope").is_empty());
    }

    #[test]
    fn test_closed_and_reopened_file() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        history.push(snapshot(vec![file("y", "other")]));
        history.push(snapshot(vec![file("x", "v1"), file("y", "other")]));
        history.push(snapshot(vec![file("x", "v2"), file("y", "other")]));

        let titles: Vec<String> = lineage(&history, "x")
            .into_iter()
            .map(|v| v.file.data.title)
            .collect();
        assert_eq!(titles, vec!["v2", "v1"]);
    }

    #[test]
    fn test_non_consecutive_repeat_is_kept() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        history.push(snapshot(vec![file("x", "v2")]));
        history.push(snapshot(vec![file("x", "v1")]));

        let versions = lineage(&history, "x");
        assert_eq!(versions.len(), 3);
        assert_eq!(versions[0].file.data.title, "v1");
        assert!(versions[0].is_latest);
    }

    #[test]
    fn test_lineage_does_not_mutate_history() {
        let mut history = History::new(snapshot(vec![file("x", "v1")]), 50);
        history.push(snapshot(vec![file("x", "v2")]));
        history.undo();
        let before = (history.len(), history.index(), history.current().clone());
        let versions = lineage(&history, "x");
        assert_eq!(versions.len(), 2);
        assert_eq!(
            (history.len(), history.index(), history.current().clone()),
            before
        );
    }

    #[test]
    fn test_compare_with_previous() {
        let mut history = History::new(snapshot(vec![file("x", "Old Title")]), 50);
        history.push(snapshot(vec![file("x", "New Title")]));
        let versions = lineage(&history, "x");
        let options = GeneratorOptions::default();

        let latest = compare_with_previous(&versions, 0, &options);
        let stats = DiffStats::of(&latest);
        assert!(stats.has_changes());
        assert!(latest.iter().any(|l| l.kind == DiffKind::Added
            && l.line.contains("CreateWindow(\"New Title\")")));
        assert!(latest.iter().any(|l| l.kind == DiffKind::Removed
            && l.line.contains("CreateWindow(\"Old Title\")")));

        let oldest = compare_with_previous(&versions, 1, &options);
        assert!(oldest.iter().all(|l| l.kind == DiffKind::Same));

        assert!(compare_with_previous(&versions, 5, &options).is_empty());
    }
}
