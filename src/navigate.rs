// Cross-solution symbol walks: implementations, hierarchy, callers,
// overloads. All listing results go through the truncation contract at the
// handler layer; this module returns full result sets.

use crate::model::SymbolKind;
use crate::semantics::refs::{self, RefHit};
use crate::semantics::SemanticIndex;
use crate::util::Deadline;
use crate::workspace::{LoadedState, Solution};
use anyhow::Result;

/// Types whose base list resolves to the given named type.
pub fn implementations(state: &LoadedState, target: usize) -> Vec<usize> {
    let index = &state.index;
    let mut out = Vec::new();
    for symbol in index.symbols.iter().filter(|s| s.kind.is_type()) {
        if symbol.id == target {
            continue;
        }
        for written in &symbol.base_types {
            if index.resolve_type(written, &symbol.namespace) == Some(target) {
                out.push(symbol.id);
                break;
            }
        }
    }
    out
}

/// Direct derived types only; transitive closure is the client's job.
pub fn derived_types(state: &LoadedState, target: usize) -> Vec<usize> {
    implementations(state, target)
}

/// Base-class chain, nearest first, stopping before the root object type.
/// An unresolved (external) base contributes its written name and ends the
/// chain.
pub fn base_chain(state: &LoadedState, id: usize) -> Vec<String> {
    let index = &state.index;
    let mut out = Vec::new();
    let mut current = id;
    loop {
        let symbol = index.symbol(current);
        if symbol.kind != SymbolKind::Class {
            break;
        }
        let Some(first) = symbol.base_types.first() else {
            break;
        };
        if is_object_name(first) {
            break;
        }
        match index.resolve_type(first, &symbol.namespace) {
            Some(base) if index.symbol(base).kind == SymbolKind::Class => {
                out.push(index.symbol(base).qualified_name.clone());
                if out.len() > 64 {
                    break;
                }
                current = base;
            }
            Some(base) if index.symbol(base).kind == SymbolKind::Interface => break,
            _ => {
                out.push(first.clone());
                break;
            }
        }
    }
    out
}

/// Transitive interface set: resolved interfaces recurse, external ones
/// contribute their written names.
pub fn all_interfaces(state: &LoadedState, id: usize) -> Vec<String> {
    let index = &state.index;
    let mut out: Vec<String> = Vec::new();
    let mut work = vec![id];
    let mut seen = std::collections::HashSet::new();
    while let Some(current) = work.pop() {
        if !seen.insert(current) {
            continue;
        }
        let symbol = index.symbol(current);
        for (position, written) in symbol.base_types.iter().enumerate() {
            if is_object_name(written) {
                continue;
            }
            match index.resolve_type(written, &symbol.namespace) {
                Some(resolved) => {
                    let record = index.symbol(resolved);
                    if record.kind == SymbolKind::Interface {
                        if !out.contains(&record.qualified_name) {
                            out.push(record.qualified_name.clone());
                        }
                        work.push(resolved);
                    } else if record.kind == SymbolKind::Class {
                        // The base class carries interfaces of its own.
                        work.push(resolved);
                    }
                }
                None => {
                    // Unresolvable entries in non-head position are interface
                    // implementations by C# syntax; a class head slot may be a
                    // base class, which the chain walk reports instead.
                    let head_of_class = symbol.kind == SymbolKind::Class && position == 0;
                    if !head_of_class && !out.contains(written) {
                        out.push(written.clone());
                    } else if head_of_class && looks_like_interface(written) && !out.contains(written)
                    {
                        out.push(written.clone());
                    }
                }
            }
        }
    }
    out
}

fn is_object_name(written: &str) -> bool {
    matches!(written.trim(), "object" | "Object" | "System.Object")
}

fn looks_like_interface(written: &str) -> bool {
    let bare = written.rsplit('.').next().unwrap_or(written);
    let mut chars = bare.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some('I'), Some(second)) if second.is_ascii_uppercase()
    )
}

#[derive(Debug, Clone)]
pub struct CallerGroup {
    /// Resolved caller symbol; None for call sites outside any member.
    pub caller: Option<usize>,
    pub sites: Vec<RefHit>,
}

/// Call sites of a method-like symbol, grouped by enclosing member.
pub fn callers(
    solution: &Solution,
    index: &SemanticIndex,
    id: usize,
    deadline: &Deadline,
) -> Result<Vec<CallerGroup>> {
    let hits = refs::find_references(solution, index, id, deadline)?;
    let mut groups: Vec<CallerGroup> = Vec::new();
    for hit in hits {
        if index.declaration_name_at(hit.doc, hit.span.start_byte) == Some(id) {
            continue;
        }
        let enclosing = index.enclosing_declaration(
            hit.doc,
            hit.span.start_byte,
            &[SymbolKind::Method, SymbolKind::Property, SymbolKind::Event],
        );
        // The declaration body of the target itself is not a caller.
        if enclosing == Some(id) {
            continue;
        }
        match groups.iter_mut().find(|g| g.caller == enclosing) {
            Some(group) => group.sites.push(hit),
            None => groups.push(CallerGroup {
                caller: enclosing,
                sites: vec![hit],
            }),
        }
    }
    Ok(groups)
}

/// Same-named ordinary methods on the containing type.
pub fn overloads(index: &SemanticIndex, id: usize) -> Vec<usize> {
    let symbol = index.symbol(id);
    index
        .symbols
        .iter()
        .filter(|s| {
            s.kind == SymbolKind::Method
                && !s.is_constructor
                && s.name == symbol.name
                && s.container == symbol.container
        })
        .map(|s| s.id)
        .collect()
}
