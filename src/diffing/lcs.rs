use super::DiffKind;

/// A token of either sequence tagged with how it changed.
pub(crate) type Change<'a> = (DiffKind, &'a str);

/// Diff two token sequences. `new` is the current revision, `old` the
/// previous one. Common leading and trailing tokens are split off before
/// the table is built.
pub(crate) fn diff_tokens<'a>(new: &[&'a str], old: &[&'a str]) -> Vec<Change<'a>> {
    let prefix = new
        .iter()
        .zip(old)
        .take_while(|(a, b)| a == b)
        .count();

    let (head, new) = new.split_at(prefix);
    let old = &old[prefix..];

    let suffix = new
        .iter()
        .rev()
        .zip(old.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let (middle, tail) = new.split_at(new.len() - suffix);
    let old = &old[..old.len() - suffix];

    let mut changes = Vec::with_capacity(prefix + middle.len() + old.len() + suffix);
    changes.extend(
        head.iter()
            .map(|token| (DiffKind::Unchanged, *token)),
    );
    changes.extend(longest_common_subsequence(middle, old));
    changes.extend(
        tail.iter()
            .map(|token| (DiffKind::Unchanged, *token)),
    );

    changes
}

/// Classic dynamic programming LCS with a full backtrace from the end of both
/// sequences. When both moves score the same the old pointer moves first, so
/// in a replacement the added token ends up listed before the deleted one.
/// Identifier reuse depends on this ordering.
fn longest_common_subsequence<'a>(new: &[&'a str], old: &[&'a str]) -> Vec<Change<'a>> {
    let m = new.len();
    let n = old.len();
    let width = n + 1;

    let mut table = vec![0usize; (m + 1) * width];
    for i in 0..m {
        for j in 0..n {
            table[(i + 1) * width + j + 1] = if new[i] == old[j] {
                table[i * width + j] + 1
            } else {
                table[i * width + j + 1].max(table[(i + 1) * width + j])
            };
        }
    }

    let mut diff = Vec::with_capacity(m + n);
    let mut i = m;
    let mut j = n;
    while i + j != 0 {
        if i > 0 && j > 0 && new[i - 1] == old[j - 1] {
            diff.push((DiffKind::Unchanged, new[i - 1]));
            i -= 1;
            j -= 1;
        } else if i != 0 && (j == 0 || table[(i - 1) * width + j] > table[i * width + j - 1]) {
            diff.push((DiffKind::Added, new[i - 1]));
            i -= 1;
        } else {
            diff.push((DiffKind::Deleted, old[j - 1]));
            j -= 1;
        }
    }

    diff.reverse();
    diff
}
