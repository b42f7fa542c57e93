// Semantic rename: rewrite every reference token of the symbol (and, for
// types, their constructors' name tokens) across the solution and diff the
// results per document.

use crate::model::ChangeType;
use crate::refactor::PendingChange;
use crate::semantics::refs;
use crate::util::Deadline;
use crate::workspace::LoadedState;
use anyhow::Result;
use std::collections::{BTreeMap, HashSet};

pub fn is_valid_identifier(name: &str) -> bool {
    let name = name.strip_prefix('@').unwrap_or(name);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Compute the per-document changes for renaming `symbol_id` to `new_name`.
/// Returns the primary symbol actually renamed (a constructor redirects to
/// its type) alongside the changes.
pub fn plan_rename(
    state: &LoadedState,
    symbol_id: usize,
    new_name: &str,
    deadline: &Deadline,
) -> Result<(usize, Vec<PendingChange>)> {
    let (primary, accepted) = refs::rename_targets(&state.index, symbol_id);
    let hits = refs::scan_references(&state.solution, &state.index, primary, &accepted, deadline)?;

    let mut by_doc: BTreeMap<(usize, usize), Vec<(usize, usize)>> = BTreeMap::new();
    let mut seen: HashSet<(usize, usize, usize)> = HashSet::new();
    for hit in hits {
        let key = (hit.doc.project, hit.doc.document);
        if !seen.insert((hit.doc.project, hit.doc.document, hit.span.start_byte)) {
            continue;
        }
        by_doc
            .entry(key)
            .or_default()
            .push((hit.span.start_byte, hit.span.end_byte));
    }

    let mut changes = Vec::new();
    for ((project, document), mut spans) in by_doc {
        let doc = &state.solution.projects[project].documents[document];
        let Some(path) = doc.path.clone() else {
            continue;
        };
        spans.sort_by(|a, b| b.0.cmp(&a.0));
        let mut text = doc.text.clone();
        for (start, end) in spans {
            text.replace_range(start..end, new_name);
        }
        if text != doc.text {
            changes.push(PendingChange {
                path,
                change_type: ChangeType::Modified,
                old_text: doc.text.clone(),
                new_text: Some(text),
            });
        }
    }
    Ok((primary, changes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_validity() {
        assert!(is_valid_identifier("Baz"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("@class"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1abc"));
        assert!(!is_valid_identifier("a b"));
    }
}
