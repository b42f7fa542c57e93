// Name search over the symbol index. Queries containing `*` or `?` are
// globs (anchored, case-insensitive); anything else is a case-insensitive
// substring match. Locals and parameters are not enumerated.

use crate::model::SymbolKind;
use crate::semantics::{SemanticIndex, SymbolRecord};
use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

/// Extra matches accumulated past the requested page so `hasMore` is
/// reliable without scanning the whole index.
const PAGE_LOOKAHEAD: usize = 100;

pub enum NameMatcher {
    Glob(Regex),
    Substring(String),
}

impl NameMatcher {
    pub fn new(query: &str) -> Result<Self> {
        if query.contains('*') || query.contains('?') {
            Ok(NameMatcher::Glob(glob_regex(query)?))
        } else {
            Ok(NameMatcher::Substring(query.to_lowercase()))
        }
    }

    /// Always a glob, even without wildcard characters (namespace filters).
    pub fn glob(pattern: &str) -> Result<Self> {
        Ok(NameMatcher::Glob(glob_regex(pattern)?))
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Glob(re) => re.is_match(name),
            NameMatcher::Substring(needle) => name.to_lowercase().contains(needle),
        }
    }
}

/// `*` -> `.*`, `?` -> `.`, everything else escaped; anchored and
/// case-insensitive.
pub fn glob_regex(pattern: &str) -> Result<Regex> {
    let mut body = String::with_capacity(pattern.len() + 8);
    for ch in pattern.chars() {
        match ch {
            '*' => body.push_str(".*"),
            '?' => body.push('.'),
            other => body.push_str(&regex::escape(&other.to_string())),
        }
    }
    RegexBuilder::new(&format!("^{body}$"))
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid pattern: {pattern}"))
}

fn searchable(symbol: &SymbolRecord) -> bool {
    !symbol.is_implicit
        && !matches!(symbol.kind, SymbolKind::Local | SymbolKind::Parameter)
}

pub struct SearchPage {
    /// Matches observed before the accumulation stop; the true total when
    /// `has_more` is false.
    pub total_observed: usize,
    pub ids: Vec<usize>,
    pub has_more: bool,
}

pub fn search_symbols(
    index: &SemanticIndex,
    query: &str,
    kind: Option<&str>,
    namespace_filter: Option<&str>,
    max_results: usize,
    offset: usize,
) -> Result<SearchPage> {
    let matcher = NameMatcher::new(query)?;
    let namespace_matcher = namespace_filter.map(NameMatcher::glob).transpose()?;
    let stop_at = offset
        .saturating_add(max_results)
        .saturating_add(PAGE_LOOKAHEAD);

    let mut matches = Vec::new();
    for symbol in index.symbols.iter() {
        if !searchable(symbol) {
            continue;
        }
        if let Some(kind_filter) = kind {
            if !kind_filter.eq_ignore_ascii_case(symbol.kind.as_str()) {
                continue;
            }
        }
        if let Some(ns_matcher) = &namespace_matcher {
            if !ns_matcher.matches(&symbol.namespace) {
                continue;
            }
        }
        if !matcher.matches(&symbol.name) {
            continue;
        }
        matches.push(symbol.id);
        if matches.len() >= stop_at {
            break;
        }
    }

    let total_observed = matches.len();
    let ids: Vec<usize> = matches.into_iter().skip(offset).take(max_results).collect();
    let has_more = total_observed > offset + ids.len();
    Ok(SearchPage {
        total_observed,
        ids,
        has_more,
    })
}

#[derive(Debug, Default)]
pub struct SemanticFilters {
    pub kinds: Vec<String>,
    pub is_async: Option<bool>,
    pub is_static: Option<bool>,
    pub namespace_filter: Option<String>,
    pub accessibility: Option<String>,
    /// Substring match on the member/local type display string.
    pub type_filter: Option<String>,
    pub return_type: Option<String>,
    /// All listed attributes must be present.
    pub attributes: Vec<String>,
    /// Each listed string must appear in some parameter type.
    pub parameter_includes: Vec<String>,
    /// No parameter type may contain any listed string.
    pub parameter_excludes: Vec<String>,
}

pub fn semantic_query(index: &SemanticIndex, filters: &SemanticFilters) -> Result<Vec<usize>> {
    let kind_set: Vec<SymbolKind> = filters
        .kinds
        .iter()
        .filter_map(|k| SymbolKind::parse(k))
        .collect();
    if !filters.kinds.is_empty() && kind_set.is_empty() {
        anyhow::bail!("no recognized symbol kind in {:?}", filters.kinds);
    }
    let accessibility = match &filters.accessibility {
        Some(raw) => Some(
            crate::model::Accessibility::parse(raw)
                .with_context(|| format!("unknown accessibility: {raw}"))?,
        ),
        None => None,
    };
    let namespace_matcher = filters
        .namespace_filter
        .as_deref()
        .map(NameMatcher::glob)
        .transpose()?;

    let mut out = Vec::new();
    for symbol in index.symbols.iter() {
        if !searchable(symbol) {
            continue;
        }
        if !kind_set.is_empty() && !kind_set.contains(&symbol.kind) {
            continue;
        }
        if let Some(wanted) = filters.is_async {
            if symbol.modifiers.is_async != wanted {
                continue;
            }
        }
        if let Some(wanted) = filters.is_static {
            if symbol.modifiers.is_static != wanted {
                continue;
            }
        }
        if let Some(wanted) = accessibility {
            if symbol.accessibility != wanted {
                continue;
            }
        }
        if let Some(ns_matcher) = &namespace_matcher {
            if !ns_matcher.matches(&symbol.namespace) {
                continue;
            }
        }
        if let Some(needle) = &filters.type_filter {
            let display = symbol.type_display.as_deref().unwrap_or("");
            if !display.contains(needle.as_str()) {
                continue;
            }
        }
        if let Some(needle) = &filters.return_type {
            let display = symbol.return_type.as_deref().unwrap_or("");
            if !display.contains(needle.as_str()) {
                continue;
            }
        }
        if !filters
            .attributes
            .iter()
            .all(|wanted| symbol.attributes.iter().any(|a| attribute_matches(a, wanted)))
        {
            continue;
        }
        if !filters.parameter_includes.iter().all(|needle| {
            symbol
                .parameters
                .iter()
                .any(|p| p.type_display.contains(needle.as_str()))
        }) {
            continue;
        }
        if filters.parameter_excludes.iter().any(|needle| {
            symbol
                .parameters
                .iter()
                .any(|p| p.type_display.contains(needle.as_str()))
        }) {
            continue;
        }
        out.push(symbol.id);
    }
    Ok(out)
}

/// Attribute name equality on the short or fully qualified form, with and
/// without the conventional Attribute suffix, case-insensitive.
fn attribute_matches(written: &str, wanted: &str) -> bool {
    let wanted_short = wanted.rsplit('.').next().unwrap_or(wanted);
    written.eq_ignore_ascii_case(wanted_short)
        || format!("{written}Attribute").eq_ignore_ascii_case(wanted_short)
        || wanted_short.eq_ignore_ascii_case(&format!("{written}Attribute"))
}
