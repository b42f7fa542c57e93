// Name-based reference resolution. An occurrence is an identifier token
// whose text equals the symbol's name; scope rules narrow the match set.
// The declaration's own name token counts as a reference, which keeps the
// reference count of any source-declared symbol at one or more.

use crate::model::{Span, SymbolKind};
use crate::semantics::SemanticIndex;
use crate::util::Deadline;
use crate::workspace::{DocKey, Solution};
use anyhow::Result;
use std::collections::HashSet;
use tree_sitter::Node;

#[derive(Debug, Clone, Copy)]
pub struct RefHit {
    pub doc: DocKey,
    pub span: Span,
}

/// All identifier tokens in a document matching `name`.
pub fn identifier_occurrences(tree: &tree_sitter::Tree, source: &str, name: &str) -> Vec<Span> {
    let mut out = Vec::new();
    collect_identifiers(tree.root_node(), source, name, &mut out);
    out
}

fn collect_identifiers(node: Node<'_>, source: &str, name: &str, out: &mut Vec<Span>) {
    if node.kind() == "identifier" {
        let text = source.get(node.start_byte()..node.end_byte()).unwrap_or("");
        if text == name {
            out.push(span_of(node));
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_identifiers(child, source, name, out);
    }
}

/// References to one symbol across the whole solution, declaration included.
pub fn find_references(
    solution: &Solution,
    index: &SemanticIndex,
    symbol_id: usize,
    deadline: &Deadline,
) -> Result<Vec<RefHit>> {
    let accepted: HashSet<usize> = [symbol_id].into_iter().collect();
    scan_references(solution, index, symbol_id, &accepted, deadline)
}

/// References accepted for a rename: for a type this also claims its
/// constructors' name tokens, and renaming a constructor renames the type.
pub fn rename_targets(index: &SemanticIndex, symbol_id: usize) -> (usize, HashSet<usize>) {
    let symbol = index.symbol(symbol_id);
    let primary = if symbol.is_constructor {
        symbol
            .container
            .as_deref()
            .and_then(|container| {
                index
                    .by_qualified_name(container)
                    .iter()
                    .copied()
                    .find(|&id| index.symbol(id).kind.is_type())
            })
            .unwrap_or(symbol_id)
    } else {
        symbol_id
    };
    let mut accepted: HashSet<usize> = [primary].into_iter().collect();
    let primary_record = index.symbol(primary);
    if primary_record.kind.is_type() {
        accepted.extend(index.constructors_of(&primary_record.qualified_name));
    }
    (primary, accepted)
}

pub fn scan_references(
    solution: &Solution,
    index: &SemanticIndex,
    symbol_id: usize,
    accepted: &HashSet<usize>,
    deadline: &Deadline,
) -> Result<Vec<RefHit>> {
    let symbol = index.symbol(symbol_id);
    let name = symbol.name.clone();
    let local_like = matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter);
    let mut hits = Vec::new();
    for key in solution.doc_keys() {
        deadline.check()?;
        if local_like && key != symbol.doc {
            continue;
        }
        let doc = solution.document(key);
        for span in identifier_occurrences(&doc.tree, &doc.text, &name) {
            if let Some(declared) = index.declaration_name_at(key, span.start_byte) {
                if !accepted.contains(&declared) {
                    continue;
                }
            }
            if local_like {
                if let Some(scope) = symbol.scope_span {
                    if !scope.contains_byte(span.start_byte) {
                        continue;
                    }
                }
            }
            hits.push(RefHit { doc: key, span });
        }
    }
    Ok(hits)
}

/// Bind an identifier occurrence to its most plausible declaration.
/// Priority: the declaration at the token itself, then an in-scope local or
/// parameter, then a member of the enclosing type, then a type, then any.
pub fn bind_identifier(
    index: &SemanticIndex,
    doc: DocKey,
    offset: usize,
    text: &str,
    token_start: usize,
) -> Option<usize> {
    if let Some(declared) = index.declaration_name_at(doc, token_start) {
        return Some(declared);
    }
    let candidates = index.candidates(text);
    if candidates.is_empty() {
        return None;
    }
    for &id in candidates {
        let symbol = index.symbol(id);
        if matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter)
            && symbol.doc == doc
            && symbol
                .scope_span
                .map(|scope| scope.contains_byte(offset))
                .unwrap_or(false)
        {
            return Some(id);
        }
    }
    if let Some(enclosing) = index.enclosing_type_name(doc, offset) {
        for &id in candidates {
            let symbol = index.symbol(id);
            if symbol.kind.is_member() && symbol.container.as_deref() == Some(enclosing.as_str()) {
                return Some(id);
            }
        }
    }
    candidates
        .iter()
        .copied()
        .find(|&id| index.symbol(id).kind.is_type())
        .or_else(|| candidates.first().copied())
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
