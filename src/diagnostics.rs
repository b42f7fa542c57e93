// Diagnostics engine. The collectors are the in-crate stand-in for
// compiler diagnostics: syntax errors from the parse tree plus
// using-directive lints. Summary counts are computed from the
// post-truncation list; tests rely on that.

use crate::model::{Diagnostic, Severity, Span};
use crate::refactor::usings;
use crate::semantics;
use crate::util;
use crate::workspace::{DocKey, LoadedState};
use std::collections::HashSet;
use tree_sitter::Node;

pub const SYNTAX_ERROR: &str = "SYN001";
pub const MISSING_TOKEN: &str = "SYN002";
pub const UNNECESSARY_USING: &str = "USG001";
pub const UNORGANIZED_USINGS: &str = "USG002";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    File(DocKey),
    Project(usize),
    Solution,
}

#[derive(Debug)]
pub struct DiagnosticsReport {
    pub diagnostics: Vec<Diagnostic>,
    pub total: usize,
    pub truncated: bool,
    /// Error/warning counts over the returned (post-truncation) list.
    pub error_count: usize,
    pub warning_count: usize,
}

pub fn document_diagnostics(state: &LoadedState, key: DocKey) -> Vec<Diagnostic> {
    let doc = state.solution.document(key);
    let path = semantics::doc_path(&state.solution, key);
    let mut out = Vec::new();
    collect_syntax(doc.tree.root_node(), &doc.text, &path, &mut out);
    collect_using_lints(state, key, &path, &mut out);
    out
}

fn collect_syntax(node: Node<'_>, source: &str, path: &str, out: &mut Vec<Diagnostic>) {
    if node.is_error() {
        let excerpt = util::excerpt(
            source
                .get(node.start_byte()..node.end_byte())
                .unwrap_or(""),
        );
        out.push(Diagnostic::new(
            SYNTAX_ERROR,
            Severity::Error,
            format!("Syntax error near '{}'", util::truncate_str_bytes(&excerpt, 60)),
            span_of(node).location(path),
        ));
        return;
    }
    if node.is_missing() {
        out.push(Diagnostic::new(
            MISSING_TOKEN,
            Severity::Error,
            format!("Missing '{}'", node.kind()),
            span_of(node).location(path),
        ));
        return;
    }
    if !node.has_error() {
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_syntax(child, source, path, out);
    }
}

fn collect_using_lints(state: &LoadedState, key: DocKey, path: &str, out: &mut Vec<Diagnostic>) {
    let doc = state.solution.document(key);
    let directives = usings::collect_usings(&doc.tree, &doc.text);
    if directives.is_empty() {
        return;
    }

    let identifiers = identifier_texts(doc.tree.root_node(), &doc.text);
    for directive in &directives {
        if !directive.is_plain() || directive.is_global {
            continue;
        }
        let declared: Vec<&str> = state
            .index
            .symbols
            .iter()
            .filter(|s| s.kind.is_type() && s.namespace == directive.name)
            .map(|s| s.name.as_str())
            .collect();
        if declared.is_empty() {
            // Namespaces the solution knows nothing about cannot be judged.
            continue;
        }
        if !declared.iter().any(|name| identifiers.contains(*name)) {
            out.push(Diagnostic::new(
                UNNECESSARY_USING,
                Severity::Warning,
                format!("Using directive for '{}' is unnecessary", directive.name),
                directive.span.location(path),
            ));
        }
    }

    if !usings::is_organized(&directives) {
        out.push(Diagnostic::new(
            UNORGANIZED_USINGS,
            Severity::Hidden,
            "Using directives are not in organized order".to_string(),
            directives[0].span.location(path),
        ));
    }
}

fn identifier_texts<'a>(node: Node<'_>, source: &'a str) -> HashSet<&'a str> {
    fn walk<'a>(node: Node<'_>, source: &'a str, out: &mut HashSet<&'a str>) {
        if node.kind() == "identifier" {
            if let Some(text) = source.get(node.start_byte()..node.end_byte()) {
                out.insert(text);
            }
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            // Names inside using directives are namespace segments, not uses.
            if child.kind() == "using_directive" {
                continue;
            }
            walk(child, source, out);
        }
    }
    let mut out = HashSet::new();
    walk(node, source, &mut out);
    out
}

pub fn collect(
    state: &LoadedState,
    scope: Scope,
    severity: Option<Severity>,
    include_hidden: bool,
    max_results: usize,
) -> DiagnosticsReport {
    let keys: Vec<DocKey> = match scope {
        Scope::File(key) => vec![key],
        Scope::Project(project) => state
            .solution
            .doc_keys()
            .filter(|k| k.project == project)
            .collect(),
        Scope::Solution => state.solution.doc_keys().collect(),
    };

    let mut all = Vec::new();
    for key in keys {
        all.extend(document_diagnostics(state, key));
    }
    all.retain(|d| match severity {
        Some(wanted) => d.severity == wanted,
        None => include_hidden || d.severity != Severity::Hidden,
    });

    let total = all.len();
    let truncated = total > max_results;
    all.truncate(max_results);
    let error_count = all.iter().filter(|d| d.severity == Severity::Error).count();
    let warning_count = all
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    DiagnosticsReport {
        diagnostics: all,
        total,
        truncated,
        error_count,
        warning_count,
    }
}

fn span_of(node: Node<'_>) -> Span {
    let start = node.start_position();
    let end = node.end_position();
    Span {
        start_line: start.row,
        start_col: start.column,
        end_line: end.row,
        end_col: end.column,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}
