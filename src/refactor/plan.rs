// Edit plans: line-level diffs between pre- and post-texts, weighted by the
// requested verbosity. Rename-style edits keep their line count, so hunks
// align by index; length-changing edits collapse to one hunk over the
// differing middle.

use crate::model::{ChangeType, DocumentEdit, EditHunk, EditPlan};
use crate::refactor::{PendingChange, Verbosity};

/// Cap on textual hunks carried per file at full verbosity.
const MAX_TEXT_HUNKS: usize = 20;

pub fn diff_lines(old: &str, new: &str) -> Vec<EditHunk> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();

    let mut prefix = 0;
    while prefix < old_lines.len()
        && prefix < new_lines.len()
        && old_lines[prefix] == new_lines[prefix]
    {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old_lines.len() - prefix
        && suffix < new_lines.len() - prefix
        && old_lines[old_lines.len() - 1 - suffix] == new_lines[new_lines.len() - 1 - suffix]
    {
        suffix += 1;
    }

    let old_mid = &old_lines[prefix..old_lines.len() - suffix];
    let new_mid = &new_lines[prefix..new_lines.len() - suffix];
    if old_mid.is_empty() && new_mid.is_empty() {
        return Vec::new();
    }

    if old_mid.len() != new_mid.len() {
        return vec![EditHunk {
            start_line: prefix,
            old_lines: old_mid.len(),
            old_text: Some(old_mid.join("\n")),
            new_text: Some(new_mid.join("\n")),
        }];
    }

    let mut hunks = Vec::new();
    let mut run_start: Option<usize> = None;
    for idx in 0..=old_mid.len() {
        let differs = idx < old_mid.len() && old_mid[idx] != new_mid[idx];
        match (differs, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                hunks.push(EditHunk {
                    start_line: prefix + start,
                    old_lines: idx - start,
                    old_text: Some(old_mid[start..idx].join("\n")),
                    new_text: Some(new_mid[start..idx].join("\n")),
                });
                run_start = None;
            }
            _ => {}
        }
    }
    hunks
}

pub fn document_edit(change: &PendingChange, verbosity: Verbosity) -> DocumentEdit {
    let path = change.path.display().to_string();
    match change.change_type {
        ChangeType::Removed => DocumentEdit {
            file_path: path,
            change_type: ChangeType::Removed,
            change_count: 1,
            new_text: None,
            hunks: None,
        },
        ChangeType::Added => {
            let new_text = change.new_text.clone().unwrap_or_default();
            DocumentEdit {
                file_path: path,
                change_type: ChangeType::Added,
                change_count: 1,
                new_text: (verbosity != Verbosity::Summary).then_some(new_text),
                hunks: None,
            }
        }
        ChangeType::Modified => {
            let new_text = change.new_text.clone().unwrap_or_default();
            let mut hunks = diff_lines(&change.old_text, &new_text);
            let change_count = hunks.len();
            match verbosity {
                Verbosity::Summary => DocumentEdit {
                    file_path: path,
                    change_type: ChangeType::Modified,
                    change_count,
                    new_text: None,
                    hunks: None,
                },
                Verbosity::Compact => {
                    for hunk in hunks.iter_mut() {
                        hunk.old_text = None;
                        hunk.new_text = None;
                    }
                    DocumentEdit {
                        file_path: path,
                        change_type: ChangeType::Modified,
                        change_count,
                        new_text: None,
                        hunks: Some(hunks),
                    }
                }
                Verbosity::Full => {
                    for hunk in hunks.iter_mut().skip(MAX_TEXT_HUNKS) {
                        hunk.old_text = None;
                        hunk.new_text = None;
                    }
                    DocumentEdit {
                        file_path: path,
                        change_type: ChangeType::Modified,
                        change_count,
                        new_text: Some(new_text),
                        hunks: Some(hunks),
                    }
                }
            }
        }
    }
}

pub fn build_plan(
    changes: &[PendingChange],
    verbosity: Verbosity,
    max_files: Option<usize>,
) -> EditPlan {
    let total_files = changes.len();
    let shown = max_files.unwrap_or(total_files).min(total_files);
    let edits: Vec<DocumentEdit> = changes
        .iter()
        .take(shown)
        .map(|c| document_edit(c, verbosity))
        .collect();
    let total_changes = changes
        .iter()
        .map(|c| match c.change_type {
            ChangeType::Modified => {
                diff_lines(&c.old_text, c.new_text.as_deref().unwrap_or("")).len()
            }
            _ => 1,
        })
        .sum();
    EditPlan {
        total_files,
        total_changes,
        edits,
        truncated: shown < total_files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_difference_no_hunks() {
        assert!(diff_lines("a\nb\n", "a\nb\n").is_empty());
    }

    #[test]
    fn aligned_replacements_produce_per_run_hunks() {
        let old = "one\ntwo\nthree\nfour\n";
        let new = "one\nTWO\nthree\nFOUR\n";
        let hunks = diff_lines(old, new);
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].start_line, 1);
        assert_eq!(hunks[0].old_text.as_deref(), Some("two"));
        assert_eq!(hunks[0].new_text.as_deref(), Some("TWO"));
        assert_eq!(hunks[1].start_line, 3);
    }

    #[test]
    fn length_change_collapses_to_one_hunk() {
        let old = "a\nb\nc\n";
        let new = "a\nc\n";
        let hunks = diff_lines(old, new);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].start_line, 1);
        assert_eq!(hunks[0].old_lines, 1);
    }

    #[test]
    fn insertion_is_a_zero_old_line_hunk() {
        let old = "a\nc\n";
        let new = "a\nb\nc\n";
        let hunks = diff_lines(old, new);
        assert_eq!(hunks.len(), 1);
        assert_eq!(hunks[0].old_lines, 0);
        assert_eq!(hunks[0].new_text.as_deref(), Some("b"));
    }
}
