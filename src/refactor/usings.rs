// Using-directive organization. Order: global directives, then plain
// directives (System root first, then alphabetic by qualified name), then
// `using static`, then aliases. Sorting is idempotent: organizing an
// organized file is a fixed point.

use crate::model::Span;
use tree_sitter::Node;

#[derive(Debug, Clone)]
pub struct UsingDirective {
    /// Trimmed directive source text, semicolon included.
    pub text: String,
    /// Imported qualified name (alias target for alias directives).
    pub name: String,
    pub alias: Option<String>,
    pub is_static: bool,
    pub is_global: bool,
    pub span: Span,
}

impl UsingDirective {
    pub fn is_system(&self) -> bool {
        self.name == "System" || self.name.starts_with("System.")
    }

    /// Plain namespace import, eligible for the unnecessary-using check.
    pub fn is_plain(&self) -> bool {
        !self.is_static && self.alias.is_none()
    }
}

/// Top-level using directives of a compilation unit, in source order.
/// Directives inside namespace bodies are left where they are.
pub fn collect_usings(tree: &tree_sitter::Tree, source: &str) -> Vec<UsingDirective> {
    let mut out = Vec::new();
    let root = tree.root_node();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if child.kind() == "using_directive" {
            if let Some(directive) = parse_directive(child, source) {
                out.push(directive);
            }
        }
    }
    out
}

fn parse_directive(node: Node<'_>, source: &str) -> Option<UsingDirective> {
    let raw = source.get(node.start_byte()..node.end_byte())?.trim();
    let mut body = raw.trim_end_matches(';').trim();
    let is_global = if let Some(rest) = body.strip_prefix("global ") {
        body = rest.trim();
        true
    } else {
        false
    };
    body = body.strip_prefix("using")?.trim();
    let is_static = if let Some(rest) = body.strip_prefix("static ") {
        body = rest.trim();
        true
    } else {
        false
    };
    let (alias, name) = match body.split_once('=') {
        Some((alias, target)) => (Some(alias.trim().to_string()), target.trim().to_string()),
        None => (None, body.to_string()),
    };
    if name.is_empty() {
        return None;
    }
    let start = node.start_position();
    let end = node.end_position();
    Some(UsingDirective {
        text: raw.to_string(),
        name,
        alias,
        is_static,
        is_global,
        span: Span {
            start_line: start.row,
            start_col: start.column,
            end_line: end.row,
            end_col: end.column,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        },
    })
}

fn sort_key(directive: &UsingDirective) -> (u8, u8, u8, String, String) {
    let group = if directive.is_global { 0u8 } else { 1 };
    let category = if directive.alias.is_some() {
        2u8
    } else if directive.is_static {
        1
    } else {
        0
    };
    let system = if category == 0 && directive.is_system() {
        0u8
    } else if category == 0 {
        1
    } else {
        0
    };
    let primary = directive
        .alias
        .clone()
        .unwrap_or_else(|| directive.name.clone());
    (group, category, system, primary.to_lowercase(), primary)
}

pub fn organized(directives: &[UsingDirective]) -> Vec<UsingDirective> {
    let mut sorted = directives.to_vec();
    sorted.sort_by_key(sort_key);
    sorted
}

pub fn is_organized(directives: &[UsingDirective]) -> bool {
    let sorted = organized(directives);
    directives
        .iter()
        .zip(sorted.iter())
        .all(|(a, b)| a.text == b.text)
}

/// Full post-organization text, or None when the file has no top-level
/// using directives. The sorted block replaces the original directives in
/// place; blank lines between directives are dropped.
pub fn organize_text(tree: &tree_sitter::Tree, source: &str) -> Option<String> {
    let directives = collect_usings(tree, source);
    if directives.is_empty() {
        return None;
    }
    let lines: Vec<&str> = source.split('\n').collect();
    let first_line = directives.iter().map(|d| d.span.start_line).min()?;
    let last_line = directives.iter().map(|d| d.span.end_line).max()?;
    let directive_lines: std::collections::HashSet<usize> = directives
        .iter()
        .flat_map(|d| d.span.start_line..=d.span.end_line)
        .collect();

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines.iter().take(first_line) {
        out.push((*line).to_string());
    }
    for directive in organized(&directives) {
        out.push(directive.text.clone());
    }
    for (idx, line) in lines.iter().enumerate().skip(first_line) {
        if directive_lines.contains(&idx) {
            continue;
        }
        if idx < last_line && line.trim().is_empty() {
            continue;
        }
        out.push((*line).to_string());
    }
    Some(out.join("\n"))
}
