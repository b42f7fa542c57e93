// Code-fix discovery and application. Providers form a fixed build-time
// registry; discovery locates the target diagnostic by three widening
// strategies and falls back to listing the nearest diagnostics. A provider
// that fails or panics is skipped and discovery continues.

use crate::diagnostics;
use crate::model::{ChangeType, Diagnostic};
use crate::refactor::{usings, PendingChange};
use crate::util;
use crate::workspace::{DocKey, LoadedState};
use anyhow::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

/// Matching tolerance for the distance strategy, in bytes.
const NEAR_DISTANCE: usize = 50;
const NEAREST_FALLBACK: usize = 10;

pub trait CodeFixProvider: Sync {
    fn name(&self) -> &'static str;
    fn fixable_ids(&self) -> &'static [&'static str];
    fn fixes(
        &self,
        state: &LoadedState,
        doc: DocKey,
        diagnostic: &Diagnostic,
    ) -> Result<Vec<CodeAction>>;
}

#[derive(Debug, Clone)]
pub struct CodeAction {
    pub title: String,
    /// Full replacement text per touched file.
    pub changes: Vec<(PathBuf, String)>,
}

pub fn providers() -> &'static [&'static dyn CodeFixProvider] {
    static PROVIDERS: [&(dyn CodeFixProvider); 2] =
        [&RemoveUnnecessaryUsing, &OrganizeUsings];
    &PROVIDERS
}

#[derive(Debug)]
pub enum Discovery {
    Found {
        diagnostic: Diagnostic,
        matched_by: &'static str,
        fixes: Vec<DiscoveredFix>,
    },
    NoMatch {
        nearest: Vec<Diagnostic>,
    },
}

#[derive(Debug, Clone)]
pub struct DiscoveredFix {
    pub index: usize,
    pub provider: &'static str,
    pub action: CodeAction,
}

/// Locate the diagnostic and collect candidate fixes in provider order.
pub fn discover(
    state: &LoadedState,
    doc: DocKey,
    diagnostic_id: &str,
    offset: Option<usize>,
) -> Discovery {
    let file_diags = diagnostics::document_diagnostics(state, doc);
    let document = state.solution.document(doc);

    let offset_of = |d: &Diagnostic| {
        util::offset_for_position(&document.text, d.location.start_line, d.location.start_column)
            .unwrap_or(0)
    };
    let span_of = |d: &Diagnostic| {
        let start = offset_of(d);
        let end =
            util::offset_for_position(&document.text, d.location.end_line, d.location.end_column)
                .unwrap_or(start);
        (start, end.max(start))
    };

    let mut matched: Option<(&Diagnostic, &'static str)> = None;
    if let Some(position) = offset {
        matched = file_diags
            .iter()
            .find(|d| {
                d.id == diagnostic_id && {
                    let (start, end) = span_of(d);
                    position >= start && position <= end
                }
            })
            .map(|d| (d, "position"))
            .or_else(|| {
                file_diags
                    .iter()
                    .filter(|d| d.id == diagnostic_id)
                    .map(|d| (d, offset_of(d).abs_diff(position)))
                    .filter(|(_, dist)| *dist <= NEAR_DISTANCE)
                    .min_by_key(|(_, dist)| *dist)
                    .map(|(d, _)| (d, "distance"))
            });
    }
    if matched.is_none() {
        matched = file_diags
            .iter()
            .find(|d| d.id == diagnostic_id)
            .map(|d| (d, "file"));
    }

    let Some((diagnostic, matched_by)) = matched else {
        let mut nearest: Vec<(usize, Diagnostic)> = file_diags
            .into_iter()
            .map(|d| (offset.map(|p| offset_of(&d).abs_diff(p)).unwrap_or(0), d))
            .collect();
        nearest.sort_by_key(|(dist, _)| *dist);
        return Discovery::NoMatch {
            nearest: nearest
                .into_iter()
                .take(NEAREST_FALLBACK)
                .map(|(_, d)| d)
                .collect(),
        };
    };

    let mut fixes = Vec::new();
    for provider in providers() {
        if !provider.fixable_ids().contains(&diagnostic.id.as_str()) {
            continue;
        }
        let result = catch_unwind(AssertUnwindSafe(|| provider.fixes(state, doc, diagnostic)));
        let actions = match result {
            Ok(Ok(actions)) => actions,
            // Provider crashes are swallowed; the remaining registry runs.
            Ok(Err(_)) | Err(_) => continue,
        };
        for action in actions {
            fixes.push(DiscoveredFix {
                index: fixes.len(),
                provider: provider.name(),
                action,
            });
        }
    }
    Discovery::Found {
        diagnostic: diagnostic.clone(),
        matched_by,
        fixes,
    }
}

/// Pending changes for one discovered fix, diffed against the pre-change
/// solution.
pub fn changes_for(state: &LoadedState, action: &CodeAction) -> Vec<PendingChange> {
    let mut out = Vec::new();
    for (path, new_text) in &action.changes {
        let canonical = util::canonical_path(path);
        let old_text = state
            .solution
            .doc_keys()
            .find(|&key| {
                state.solution.document(key).canonical_path.as_deref()
                    == Some(canonical.as_str())
            })
            .map(|key| state.solution.document(key).text.clone());
        match old_text {
            Some(old_text) => {
                if old_text != *new_text {
                    out.push(PendingChange {
                        path: path.clone(),
                        change_type: ChangeType::Modified,
                        old_text,
                        new_text: Some(new_text.clone()),
                    });
                }
            }
            None => out.push(PendingChange {
                path: path.clone(),
                change_type: ChangeType::Added,
                old_text: String::new(),
                new_text: Some(new_text.clone()),
            }),
        }
    }
    out
}

struct RemoveUnnecessaryUsing;

impl CodeFixProvider for RemoveUnnecessaryUsing {
    fn name(&self) -> &'static str {
        "remove_unnecessary_using"
    }

    fn fixable_ids(&self) -> &'static [&'static str] {
        &[diagnostics::UNNECESSARY_USING]
    }

    fn fixes(
        &self,
        state: &LoadedState,
        doc: DocKey,
        diagnostic: &Diagnostic,
    ) -> Result<Vec<CodeAction>> {
        let document = state.solution.document(doc);
        let Some(path) = document.path.clone() else {
            return Ok(Vec::new());
        };
        let target_line = diagnostic.location.start_line;
        let directives = usings::collect_usings(&document.tree, &document.text);
        let Some(directive) = directives
            .iter()
            .find(|d| d.span.start_line <= target_line && target_line <= d.span.end_line)
        else {
            return Ok(Vec::new());
        };
        let new_text: String = document
            .text
            .split('\n')
            .enumerate()
            .filter(|(idx, _)| *idx < directive.span.start_line || *idx > directive.span.end_line)
            .map(|(_, line)| line)
            .collect::<Vec<_>>()
            .join("\n");
        Ok(vec![CodeAction {
            title: format!("Remove unnecessary using '{}'", directive.name),
            changes: vec![(path, new_text)],
        }])
    }
}

struct OrganizeUsings;

impl CodeFixProvider for OrganizeUsings {
    fn name(&self) -> &'static str {
        "organize_usings"
    }

    fn fixable_ids(&self) -> &'static [&'static str] {
        &[diagnostics::UNORGANIZED_USINGS]
    }

    fn fixes(
        &self,
        state: &LoadedState,
        doc: DocKey,
        _diagnostic: &Diagnostic,
    ) -> Result<Vec<CodeAction>> {
        let document = state.solution.document(doc);
        let Some(path) = document.path.clone() else {
            return Ok(Vec::new());
        };
        let Some(new_text) = usings::organize_text(&document.tree, &document.text) else {
            return Ok(Vec::new());
        };
        if new_text == document.text {
            return Ok(Vec::new());
        }
        Ok(vec![CodeAction {
            title: "Organize using directives".to_string(),
            changes: vec![(path, new_text)],
        }])
    }
}
