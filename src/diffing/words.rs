use super::lcs::{diff_tokens, Change};
use super::{DiffKind, DiffPart};

/// Split lines into word tokens: runs of non-whitespace, runs of other
/// whitespace, and a newline token closing every line.
pub(crate) fn tokenize<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let re = compile!(r"\S+|\n|[^\S\n]+");

    lines
        .iter()
        .flat_map(|line| {
            re.find_iter(line)
                .map(|token| token.as_str())
                .chain(std::iter::once("\n"))
        })
        .collect()
}

/// Re-diff a run of added lines against the run of deleted lines it
/// replaced, one word at a time, and fold the result back into one record
/// per line of the current text.
pub(crate) fn rediff(added: &[&str], deleted: &[&str]) -> Vec<DiffPart> {
    let new = tokenize(added);
    let old = tokenize(deleted);

    fold(diff_tokens(&new, &old))
}

/// Fold word changes into line records. A line whose tokens changed in
/// different ways is Modified. A deleted newline means two old lines were
/// merged; each one is followed by an empty Deleted record so that the old
/// lines stay counted. A newline inserted in the middle of an existing line
/// makes the next line an Added one.
fn fold(changes: Vec<Change<'_>>) -> Vec<DiffPart> {
    let mut lines = Vec::new();
    let mut line: Option<DiffPart> = None;
    let mut deleted_newlines = 0;
    let mut next_line_new = false;

    for (kind, token) in changes {
        let current = line.get_or_insert_with(|| {
            deleted_newlines = 0;
            DiffPart {
                text: None,
                original: None,
                kind,
            }
        });

        if token == "\n" {
            if kind == DiffKind::Deleted {
                deleted_newlines += 1;
                continue;
            }

            if next_line_new {
                current.kind = DiffKind::Added;
                next_line_new = false;
            }
            if kind == DiffKind::Added && current.kind != DiffKind::Added {
                next_line_new = true;
            }

            // the newline survived, so there is a line in the current text
            // even when all of its words were removed
            if current
                .text
                .is_none()
            {
                current.text = Some(String::new());
            }

            if let Some(finished) = line.take() {
                lines.push(finished);
            }
            for _ in 0..deleted_newlines {
                lines.push(DiffPart {
                    text: None,
                    original: None,
                    kind: DiffKind::Deleted,
                });
            }

            continue;
        }

        if kind != current.kind {
            current.kind = DiffKind::Modified;
        }

        if kind != DiffKind::Deleted {
            current
                .text
                .get_or_insert_with(String::new)
                .push_str(token);
        }
        if kind != DiffKind::Added {
            current
                .original
                .get_or_insert_with(String::new)
                .push_str(token);
        }
    }

    lines
}
