//! Line-level diff between two generated scripts.
//!
//! This is a greedy single pass, not a minimum edit script. A new line that
//! still appears further down the old text is not reported as added; the old
//! lines in front of it are reported as removed until the two sides line up
//! again.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DiffKind {
    Same,
    Added,
    Removed,
}

impl DiffKind {
    pub const fn marker(&self) -> char {
        match self {
            DiffKind::Same => ' ',
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DiffLine {
    pub(crate) kind: DiffKind,
    pub(crate) line: String,
}

impl DiffLine {
    fn new(kind: DiffKind, line: &str) -> Self {
        Self {
            kind,
            line: line.to_owned(),
        }
    }
}

/// Computes the ordered edit script turning `old` into `new`.
///
/// Both inputs are split on `'\n'` only, so a trailing newline yields a final
/// empty line and the empty string is a single empty line.
pub(crate) fn diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old: Vec<&str> = old.split('\n').collect();
    let new: Vec<&str> = new.split('\n').collect();
    let mut out = Vec::with_capacity(old.len().max(new.len()));

    let (mut i, mut j) = (0, 0);
    while i < old.len() || j < new.len() {
        if i < old.len() && j < new.len() && old[i] == new[j] {
            out.push(DiffLine::new(DiffKind::Same, old[i]));
            i += 1;
            j += 1;
        } else if j < new.len() && !old[i.min(old.len())..].contains(&new[j]) {
            out.push(DiffLine::new(DiffKind::Added, new[j]));
            j += 1;
        } else if i < old.len() {
            out.push(DiffLine::new(DiffKind::Removed, old[i]));
            i += 1;
        } else {
            // Old side exhausted while the new line claims to still occur in
            // it; cannot happen with an empty suffix, skip to stay total.
            j += 1;
        }
    }
    out
}

/// Counts of added and removed lines in an edit script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct DiffStats {
    pub(crate) added: usize,
    pub(crate) removed: usize,
    pub(crate) same: usize,
}

impl DiffStats {
    pub fn of(lines: &[DiffLine]) -> Self {
        lines.iter().fold(Self::default(), |mut stats, l| {
            match l.kind {
                DiffKind::Same => stats.same += 1,
                DiffKind::Added => stats.added += 1,
                DiffKind::Removed => stats.removed += 1,
            }
            stats
        })
    }

    pub fn has_changes(&self) -> bool {
        self.added > 0 || self.removed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use DiffKind::*;

    fn kinds(lines: &[DiffLine]) -> Vec<(DiffKind, &str)> {
        lines.iter().map(|l| (l.kind, l.line.as_str())).collect()
    }

    #[test]
    fn test_identical_texts_are_all_same() {
        let text = "local a = 1\nprint(a)\n\nend";
        let result = diff(text, text);
        assert_eq!(result.len(), 4);
        assert!(result.iter().all(|l| l.kind == Same));
        let lines: Vec<&str> = result.iter().map(|l| l.line.as_str()).collect();
        assert_eq!(lines, text.split('\n').collect::<Vec<_>>());
        assert!(!DiffStats::of(&result).has_changes());
    }

    #[test]
    fn test_single_line_substitution() {
        let result = diff("a\nb\nc", "a\nx\nc");
        assert_eq!(
            kinds(&result),
            vec![(Same, "a"), (Added, "x"), (Removed, "b"), (Same, "c")]
        );
    }

    #[test]
    fn test_pure_insertion() {
        let result = diff("a\nc", "a\nb\nc");
        assert_eq!(kinds(&result), vec![(Same, "a"), (Added, "b"), (Same, "c")]);
        let stats = DiffStats::of(&result);
        assert_eq!((stats.added, stats.removed, stats.same), (1, 0, 2));
    }

    #[test]
    fn test_pure_deletion() {
        let result = diff("a\nb\nc", "a\nc");
        assert_eq!(
            kinds(&result),
            vec![(Same, "a"), (Removed, "b"), (Same, "c")]
        );
    }

    #[test]
    fn test_line_moved_later_is_removed_then_matched() {
        // "b" still occurs in the old suffix, so "a" is dropped rather than
        // "b" being reported as new.
        let result = diff("a\nb", "b\na");
        assert_eq!(
            kinds(&result),
            vec![(Removed, "a"), (Same, "b"), (Added, "a")]
        );
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(kinds(&diff("", "")), vec![(Same, "")]);
        assert_eq!(kinds(&diff("", "a")), vec![(Added, "a"), (Removed, "")]);
        assert_eq!(
            kinds(&diff("a\nb", "")),
            vec![(Added, ""), (Removed, "a"), (Removed, "b")]
        );
    }

    #[test]
    fn test_appended_lines() {
        let result = diff("a", "a\nb\nc");
        assert_eq!(
            kinds(&result),
            vec![(Same, "a"), (Added, "b"), (Added, "c")]
        );
    }

    #[test]
    fn test_repeated_lines() {
        let result = diff("x\nx\ny", "x\ny\nx");
        assert_eq!(
            kinds(&result),
            vec![(Same, "x"), (Removed, "x"), (Same, "y"), (Added, "x")]
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(Same.marker(), ' ');
        assert_eq!(Added.marker(), '+');
        assert_eq!(Removed.marker(), '-');
    }
}
