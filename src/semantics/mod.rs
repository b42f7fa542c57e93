// Solution-wide symbol index. Built once per load/commit by walking every
// document tree; queries never mutate it.

pub mod extract;
pub mod refs;

pub use extract::{Modifiers, ParamInfo, SymbolRecord};

use crate::model::{Location, SymbolKind};
use crate::workspace::{DocKey, Solution};
use std::collections::HashMap;

pub struct SemanticIndex {
    pub symbols: Vec<SymbolRecord>,
    by_name: HashMap<String, Vec<usize>>,
    by_qualified: HashMap<String, Vec<usize>>,
    by_doc: HashMap<DocKey, Vec<usize>>,
    /// Name-token start byte -> declaring symbol, per document.
    decl_names: HashMap<(DocKey, usize), usize>,
}

impl SemanticIndex {
    pub fn build(solution: &Solution) -> Self {
        let mut symbols: Vec<SymbolRecord> = Vec::new();
        for key in solution.doc_keys() {
            let doc = solution.document(key);
            extract::extract_document(key, &doc.tree, &doc.text, &mut symbols);
        }
        merge_namespaces(&mut symbols);

        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_qualified: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_doc: HashMap<DocKey, Vec<usize>> = HashMap::new();
        let mut decl_names: HashMap<(DocKey, usize), usize> = HashMap::new();
        for (id, symbol) in symbols.iter_mut().enumerate() {
            symbol.id = id;
            by_name.entry(symbol.name.clone()).or_default().push(id);
            by_qualified
                .entry(symbol.qualified_name.clone())
                .or_default()
                .push(id);
            by_doc.entry(symbol.doc).or_default().push(id);
            decl_names.insert((symbol.doc, symbol.name_span.start_byte), id);
        }

        Self {
            symbols,
            by_name,
            by_qualified,
            by_doc,
            decl_names,
        }
    }

    pub fn symbol(&self, id: usize) -> &SymbolRecord {
        &self.symbols[id]
    }

    pub fn candidates(&self, name: &str) -> &[usize] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_qualified_name(&self, qualified: &str) -> &[usize] {
        self.by_qualified
            .get(qualified)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn in_document(&self, key: DocKey) -> &[usize] {
        self.by_doc.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Symbol whose declaration name token starts at the given byte.
    pub fn declaration_name_at(&self, key: DocKey, start_byte: usize) -> Option<usize> {
        self.decl_names.get(&(key, start_byte)).copied()
    }

    /// Symbol whose declaration node starts at the given byte (first match
    /// for multi-declarator statements).
    pub fn declaration_starting_at(&self, key: DocKey, start_byte: usize) -> Option<usize> {
        self.in_document(key)
            .iter()
            .copied()
            .find(|&id| self.symbols[id].decl_span.start_byte == start_byte)
    }

    /// Constructors declared on the given type.
    pub fn constructors_of(&self, type_qualified: &str) -> Vec<usize> {
        self.symbols
            .iter()
            .filter(|s| s.is_constructor && s.container.as_deref() == Some(type_qualified))
            .map(|s| s.id)
            .collect()
    }

    pub fn members_of(&self, type_qualified: &str) -> Vec<usize> {
        self.symbols
            .iter()
            .filter(|s| s.kind.is_member() && s.container.as_deref() == Some(type_qualified))
            .map(|s| s.id)
            .collect()
    }

    /// Resolve a base-list entry written in source to a type in the index.
    /// Generic arguments and nullability marks are stripped before matching.
    pub fn resolve_type(&self, written: &str, from_namespace: &str) -> Option<usize> {
        let bare = strip_type_decorations(written);
        if bare.is_empty() {
            return None;
        }
        if bare.contains('.') {
            if let Some(&id) = self
                .by_qualified
                .get(bare.as_str())
                .and_then(|ids| ids.iter().find(|&&id| self.symbols[id].kind.is_type()))
            {
                return Some(id);
            }
            // Partially qualified: match on trailing segments.
            let suffix = format!(".{bare}");
            return self
                .symbols
                .iter()
                .find(|s| s.kind.is_type() && s.qualified_name.ends_with(&suffix))
                .map(|s| s.id);
        }
        let type_candidates: Vec<usize> = self
            .candidates(&bare)
            .iter()
            .copied()
            .filter(|&id| self.symbols[id].kind.is_type())
            .collect();
        match type_candidates.len() {
            0 => None,
            1 => Some(type_candidates[0]),
            _ => type_candidates
                .iter()
                .copied()
                .find(|&id| self.symbols[id].namespace == from_namespace)
                .or(Some(type_candidates[0])),
        }
    }

    /// Smallest declaration of one of the given kinds containing the byte.
    pub fn enclosing_declaration(
        &self,
        key: DocKey,
        byte: usize,
        kinds: &[SymbolKind],
    ) -> Option<usize> {
        self.in_document(key)
            .iter()
            .copied()
            .filter(|&id| {
                let s = &self.symbols[id];
                kinds.contains(&s.kind) && s.decl_span.contains_byte(byte)
            })
            .min_by_key(|&id| {
                let span = self.symbols[id].decl_span;
                span.end_byte - span.start_byte
            })
    }

    /// Qualified name of the innermost type containing the byte.
    pub fn enclosing_type_name(&self, key: DocKey, byte: usize) -> Option<String> {
        self.enclosing_declaration(
            key,
            byte,
            &[
                SymbolKind::Class,
                SymbolKind::Struct,
                SymbolKind::Interface,
                SymbolKind::Enum,
            ],
        )
        .map(|id| self.symbols[id].qualified_name.clone())
    }

    pub fn primary_location(&self, solution: &Solution, id: usize) -> Location {
        let symbol = &self.symbols[id];
        symbol.decl_span.location(&doc_path(solution, symbol.doc))
    }

    pub fn name_location(&self, solution: &Solution, id: usize) -> Location {
        let symbol = &self.symbols[id];
        symbol.name_span.location(&doc_path(solution, symbol.doc))
    }

    pub fn all_locations(&self, solution: &Solution, id: usize) -> Vec<Location> {
        let symbol = &self.symbols[id];
        let mut out = vec![self.primary_location(solution, id)];
        for (doc, span) in &symbol.extra_locations {
            out.push(span.location(&doc_path(solution, *doc)));
        }
        out
    }
}

pub fn doc_path(solution: &Solution, key: DocKey) -> String {
    solution
        .document(key)
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<in-memory>".to_string())
}

fn merge_namespaces(symbols: &mut Vec<SymbolRecord>) {
    let mut first_by_name: HashMap<String, usize> = HashMap::new();
    let mut extras: HashMap<usize, Vec<(DocKey, crate::model::Span)>> = HashMap::new();
    let mut keep = vec![true; symbols.len()];
    for (idx, symbol) in symbols.iter().enumerate() {
        if symbol.kind != SymbolKind::Namespace {
            continue;
        }
        match first_by_name.get(&symbol.qualified_name) {
            None => {
                first_by_name.insert(symbol.qualified_name.clone(), idx);
            }
            Some(&first) => {
                keep[idx] = false;
                extras
                    .entry(first)
                    .or_default()
                    .push((symbol.doc, symbol.decl_span));
            }
        }
    }
    for (idx, locations) in extras {
        symbols[idx].extra_locations.extend(locations);
    }
    let mut position = 0;
    symbols.retain(|_| {
        let kept = keep[position];
        position += 1;
        kept
    });
}

fn strip_type_decorations(written: &str) -> String {
    let mut bare = written.trim();
    if let Some(pos) = bare.find('<') {
        bare = &bare[..pos];
    }
    bare.trim_end_matches("[]").trim_end_matches('?').trim().to_string()
}
