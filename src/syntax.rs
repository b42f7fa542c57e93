// Position resolution (file, 0-based line, 0-based column) -> symbol, with
// the tolerance ladder: exact token, enclosing node, up to five ancestors,
// then one-byte probes either side. Clients that miss get a structured
// not-found payload instead of a bare error.

use crate::model::SymbolKind;
use crate::semantics::refs;
use crate::util;
use crate::workspace::{DocKey, LoadedState};
use anyhow::Result;
use tree_sitter::{Node, Parser};

pub fn new_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    let language = tree_sitter_c_sharp::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|err| anyhow::anyhow!("load C# grammar: {err}"))?;
    Ok(parser)
}

#[derive(Debug, Clone)]
pub enum Binding {
    /// A declaration in the loaded solution.
    Source(usize),
    /// A name that binds to nothing in source; defined in external metadata.
    External(String),
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub binding: Binding,
    pub found_via: String,
    pub token_text: String,
    pub token_kind: String,
    pub node_kind: String,
}

#[derive(Debug, Clone)]
pub struct NotFoundInfo {
    pub token_text: String,
    pub token_kind: String,
    pub node_kind: String,
    pub strategies: Vec<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ResolveFailure {
    InvalidPosition { line: i64, column: i64, line_count: usize },
    NotFound(Box<NotFoundInfo>),
}

const DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "struct_declaration",
    "enum_declaration",
    "record_declaration",
    "delegate_declaration",
    "method_declaration",
    "constructor_declaration",
    "property_declaration",
    "field_declaration",
    "event_field_declaration",
    "event_declaration",
    "enum_member_declaration",
    "variable_declarator",
    "parameter",
    "namespace_declaration",
    "file_scoped_namespace_declaration",
];

pub fn resolve_position(
    state: &LoadedState,
    key: DocKey,
    line: i64,
    column: i64,
) -> Result<Resolution, ResolveFailure> {
    let doc = state.solution.document(key);
    let line_count = doc.text.split('\n').count();
    if line < 0 || column < 0 {
        return Err(ResolveFailure::InvalidPosition {
            line,
            column,
            line_count,
        });
    }
    let offset = util::offset_for_position(&doc.text, line as usize, column as usize).ok_or(
        ResolveFailure::InvalidPosition {
            line,
            column,
            line_count,
        },
    )?;

    let mut strategies = Vec::new();
    if let Some(resolution) = probe(state, key, offset, "", &mut strategies) {
        return Ok(resolution);
    }
    for (delta, label) in [(-1i64, "offsetProbe(-1)"), (1, "offsetProbe(+1)")] {
        let probed = offset as i64 + delta;
        if probed < 0 || probed as usize > doc.text.len() {
            continue;
        }
        strategies.push(label.to_string());
        if let Some(resolution) = probe(state, key, probed as usize, label, &mut strategies) {
            return Ok(resolution);
        }
    }

    let (token_text, token_kind, node_kind) = token_info(state, key, offset);
    Err(ResolveFailure::NotFound(Box::new(NotFoundInfo {
        token_text,
        token_kind,
        node_kind,
        strategies,
        hint: position_hint(state, key, line as usize),
    })))
}

fn probe(
    state: &LoadedState,
    key: DocKey,
    offset: usize,
    via_prefix: &str,
    strategies: &mut Vec<String>,
) -> Option<Resolution> {
    let doc = state.solution.document(key);
    let root = doc.tree.root_node();
    let token = root.descendant_for_byte_range(offset, offset)?;
    let node = token.parent().unwrap_or(token);

    let describe = |via: &str| {
        if via_prefix.is_empty() {
            via.to_string()
        } else {
            format!("{via_prefix}:{via}")
        }
    };
    let make = |binding: Binding, via: String| Resolution {
        binding,
        found_via: via,
        token_text: node_text(token, &doc.text),
        token_kind: token.kind().to_string(),
        node_kind: node.kind().to_string(),
    };

    strategies.push(describe("declaredSymbol"));
    if let Some(id) = declared_symbol(state, key, node) {
        return Some(make(Binding::Source(id), describe("declaredSymbol")));
    }
    strategies.push(describe("referencedSymbol"));
    if let Some(binding) = referenced_symbol(state, key, token, node, offset) {
        return Some(make(binding, describe("referencedSymbol")));
    }

    let mut ancestor = node;
    for level in 1..=5usize {
        ancestor = ancestor.parent()?;
        let via_decl = describe(&format!("ancestorDeclaration({level})"));
        strategies.push(via_decl.clone());
        if let Some(id) = declared_symbol(state, key, ancestor) {
            return Some(make(Binding::Source(id), via_decl));
        }
        let via_ref = describe(&format!("ancestorReference({level})"));
        strategies.push(via_ref.clone());
        if let Some(binding) = referenced_symbol(state, key, ancestor, ancestor, offset) {
            return Some(make(binding, via_ref));
        }
    }
    None
}

fn declared_symbol(state: &LoadedState, key: DocKey, node: Node<'_>) -> Option<usize> {
    if !DECLARATION_KINDS.contains(&node.kind()) {
        return None;
    }
    state
        .index
        .declaration_starting_at(key, node.start_byte())
}

fn referenced_symbol(
    state: &LoadedState,
    key: DocKey,
    token: Node<'_>,
    node: Node<'_>,
    offset: usize,
) -> Option<Binding> {
    let doc = state.solution.document(key);
    let identifier = if token.kind() == "identifier" {
        Some(token)
    } else if node.kind() == "identifier" {
        Some(node)
    } else {
        node.child_by_field_name("name")
            .filter(|n| n.kind() == "identifier")
    }?;
    let text = node_text(identifier, &doc.text);
    if text.is_empty() {
        return None;
    }
    match refs::bind_identifier(&state.index, key, offset, &text, identifier.start_byte()) {
        Some(id) => Some(Binding::Source(id)),
        None => Some(Binding::External(text)),
    }
}

fn token_info(state: &LoadedState, key: DocKey, offset: usize) -> (String, String, String) {
    let doc = state.solution.document(key);
    let root = doc.tree.root_node();
    match root.descendant_for_byte_range(offset, offset) {
        Some(token) => {
            let node = token.parent().unwrap_or(token);
            (
                util::truncate_str_bytes(&node_text(token, &doc.text), 80),
                token.kind().to_string(),
                node.kind().to_string(),
            )
        }
        None => (String::new(), String::new(), String::new()),
    }
}

/// Positional hint for the not-found payload: the nearest declaration name
/// token, preferring the requested line.
fn position_hint(state: &LoadedState, key: DocKey, line: usize) -> Option<String> {
    let nearest = state
        .index
        .in_document(key)
        .iter()
        .copied()
        .filter(|&id| {
            !matches!(
                state.index.symbol(id).kind,
                SymbolKind::Local | SymbolKind::Parameter
            )
        })
        .min_by_key(|&id| {
            let span = state.index.symbol(id).name_span;
            span.start_line.abs_diff(line)
        })?;
    let symbol = state.index.symbol(nearest);
    Some(format!(
        "nearest symbol is '{}'; try line = {}, column = {}",
        symbol.name, symbol.name_span.start_line, symbol.name_span.start_col
    ))
}

fn node_text(node: Node<'_>, source: &str) -> String {
    source
        .get(node.start_byte()..node.end_byte())
        .unwrap_or("")
        .to_string()
}
