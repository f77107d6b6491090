//! Line diff between two revisions of a key, used to carry identifiers over
//! from one revision to the next.

use serde::Serialize;
use tracing::trace;

mod lcs;
mod words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiffKind {
    Added,
    Deleted,
    Modified,
    Unchanged,
}

/// One line of the comparison. `text` is the line as it is now and is absent
/// when the line was removed; `original` is the line as it was and is absent
/// when the line is new. Placeholders for old lines merged into another one
/// carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffPart {
    pub text: Option<String>,
    pub original: Option<String>,
    pub kind: DiffKind,
}

impl DiffPart {
    fn unchanged(line: &str) -> DiffPart {
        DiffPart {
            text: Some(line.to_string()),
            original: Some(line.to_string()),
            kind: DiffKind::Unchanged,
        }
    }

    fn added(line: &str) -> DiffPart {
        DiffPart {
            text: Some(line.to_string()),
            original: None,
            kind: DiffKind::Added,
        }
    }

    fn deleted(line: &str) -> DiffPart {
        DiffPart {
            text: None,
            original: Some(line.to_string()),
            kind: DiffKind::Deleted,
        }
    }
}

pub type ResourceDiff = Vec<DiffPart>;

/// Compare two revisions line by line. Runs of added lines that replace runs
/// of deleted lines are compared again word by word, so that an edited line
/// comes out as one Modified record instead of a deletion and an addition.
pub fn diff(old: &str, new: &str) -> ResourceDiff {
    let new_lines: Vec<&str> = new
        .trim_end()
        .split('\n')
        .collect();
    let old_lines: Vec<&str> = old
        .trim_end()
        .split('\n')
        .collect();

    let changes = lcs::diff_tokens(&new_lines, &old_lines);

    let mut parts = Vec::with_capacity(changes.len());
    let mut added = Vec::new();
    let mut deleted = Vec::new();

    for (kind, line) in changes {
        match kind {
            DiffKind::Added => added.push(line),
            DiffKind::Deleted => deleted.push(line),
            _ => {
                parts.extend(merge(&added, &deleted));
                added.clear();
                deleted.clear();
                parts.push(DiffPart::unchanged(line));
            }
        }
    }
    parts.extend(merge(&added, &deleted));

    trace!(
        parts = parts.len(),
        changed = parts
            .iter()
            .filter(|part| part.kind != DiffKind::Unchanged)
            .count()
    );

    parts
}

fn merge(added: &[&str], deleted: &[&str]) -> Vec<DiffPart> {
    match (added.is_empty(), deleted.is_empty()) {
        (false, false) => words::rediff(added, deleted),
        (false, true) => added
            .iter()
            .map(|line| DiffPart::added(line))
            .collect(),
        (true, false) => deleted
            .iter()
            .map(|line| DiffPart::deleted(line))
            .collect(),
        (true, true) => Vec::new(),
    }
}
