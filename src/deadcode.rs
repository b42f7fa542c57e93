// Dead-code analysis: declarations whose reference count never leaves the
// declaration itself. Framework-shaped types are excluded by fixed marker
// lists; both lists are part of the tool's contract and tests may inject
// additions.

use crate::model::{Accessibility, SymbolKind};
use crate::navigate;
use crate::semantics::refs;
use crate::semantics::SymbolRecord;
use crate::util::Deadline;
use crate::workspace::LoadedState;
use anyhow::Result;
use std::collections::BTreeMap;

/// Base types and interfaces whose presence anywhere in a type's hierarchy
/// marks it as framework-driven. Substring match on the displayed name,
/// case-insensitive.
pub const FRAMEWORK_BASE_MARKERS: &[&str] = &[
    "IHostedService",
    "BackgroundService",
    "ControllerBase",
    "Controller",
    "IActionFilter",
    "IAuthorizationFilter",
    "IExceptionFilter",
    "IMiddleware",
    "DbContext",
    "IRequestHandler",
    "INotificationHandler",
    "AbstractValidator",
    "Profile",
    "IDisposable",
    "IAsyncDisposable",
    "IHealthCheck",
];

/// Attribute short names that mark a type as reachable by the framework.
/// Substring match, case-insensitive.
pub const FRAMEWORK_ATTRIBUTE_MARKERS: &[&str] = &[
    "Controller",
    "ApiController",
    "Route",
    "Authorize",
    "HttpGet",
    "HttpPost",
    "HttpPut",
    "HttpDelete",
    "Test",
    "Fact",
    "Theory",
    "Benchmark",
    "DataContract",
    "DataMember",
    "JsonProperty",
    "Serializable",
    "Export",
    "Import",
];

#[derive(Debug, Clone, Default)]
pub struct DeadCodeOptions {
    /// Restrict the scan to one project by exact name.
    pub project_name: Option<String>,
    pub include_private: bool,
    pub include_internal: bool,
    /// Restrict flagged symbols to one kind.
    pub symbol_kind_filter: Option<SymbolKind>,
    pub max_results: usize,
    /// Test hook: markers appended to the fixed lists.
    pub extra_base_markers: Vec<String>,
    pub extra_attribute_markers: Vec<String>,
}

impl DeadCodeOptions {
    pub fn new() -> Self {
        Self {
            project_name: None,
            include_private: true,
            include_internal: true,
            symbol_kind_filter: None,
            max_results: 50,
            extra_base_markers: Vec::new(),
            extra_attribute_markers: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeadSymbol {
    pub id: usize,
    pub reference_count: usize,
}

#[derive(Debug)]
pub struct DeadCodeReport {
    pub flagged: Vec<DeadSymbol>,
    pub total_found: usize,
    pub truncated: bool,
    /// Flagged counts by kind over the full (pre-cap) set.
    pub by_kind: BTreeMap<&'static str, usize>,
}

pub fn analyze(
    state: &LoadedState,
    options: &DeadCodeOptions,
    deadline: &Deadline,
) -> Result<DeadCodeReport> {
    let index = &state.index;
    let project_filter: Option<usize> = match &options.project_name {
        Some(name) => {
            let found = state
                .solution
                .projects
                .iter()
                .position(|p| &p.name == name);
            match found {
                Some(project) => Some(project),
                None => anyhow::bail!("project not found: {name}"),
            }
        }
        None => None,
    };

    let mut flagged = Vec::new();
    for symbol in index.symbols.iter() {
        deadline.check()?;
        if let Some(project) = project_filter {
            if symbol.doc.project != project {
                continue;
            }
        }
        if symbol.is_implicit || !accessibility_included(symbol, options) {
            continue;
        }

        if symbol.kind.is_type() {
            if is_framework_type(state, symbol, options) {
                continue;
            }
            let references =
                refs::find_references(&state.solution, index, symbol.id, deadline)?.len();
            if references > 1 {
                continue;
            }
            // A utility type's name may go unreferenced while its members
            // are called constantly; a busy member keeps the type alive.
            let busy_member = index
                .members_of(&symbol.qualified_name)
                .into_iter()
                .filter(|&id| {
                    matches!(
                        index.symbol(id).accessibility,
                        Accessibility::Public | Accessibility::Internal
                    )
                })
                .any(|id| {
                    refs::find_references(&state.solution, index, id, deadline)
                        .map(|hits| hits.len() > 1)
                        .unwrap_or(false)
                });
            if busy_member {
                continue;
            }
            flagged.push(DeadSymbol {
                id: symbol.id,
                reference_count: references,
            });
        } else if member_candidate(index.symbol(symbol.id)) {
            if let Some(container) = symbol.container.as_deref() {
                let container_is_framework = index
                    .by_qualified_name(container)
                    .iter()
                    .any(|&id| is_framework_type(state, index.symbol(id), options));
                if container_is_framework {
                    continue;
                }
            }
            let references =
                refs::find_references(&state.solution, index, symbol.id, deadline)?.len();
            if references <= 1 {
                flagged.push(DeadSymbol {
                    id: symbol.id,
                    reference_count: references,
                });
            }
        }
    }

    if let Some(kind) = options.symbol_kind_filter {
        flagged.retain(|d| index.symbol(d.id).kind == kind);
    }

    let mut by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
    for dead in &flagged {
        *by_kind.entry(index.symbol(dead.id).kind.as_str()).or_default() += 1;
    }
    let total_found = flagged.len();
    let truncated = total_found > options.max_results;
    flagged.truncate(options.max_results);
    Ok(DeadCodeReport {
        flagged,
        total_found,
        truncated,
        by_kind,
    })
}

fn accessibility_included(symbol: &SymbolRecord, options: &DeadCodeOptions) -> bool {
    match symbol.accessibility {
        Accessibility::Private | Accessibility::PrivateProtected => options.include_private,
        Accessibility::Internal | Accessibility::ProtectedInternal => options.include_internal,
        Accessibility::Public | Accessibility::Protected => true,
    }
}

/// Members eligible for flagging: ordinary methods, properties, fields.
/// Constructors, operators, overrides, and virtuals stay out; so do events
/// (framework wiring is invisible to a reference scan).
fn member_candidate(symbol: &SymbolRecord) -> bool {
    match symbol.kind {
        SymbolKind::Method => {
            !symbol.is_constructor
                && !symbol.modifiers.is_override
                && !symbol.modifiers.is_virtual
                && !symbol.modifiers.is_abstract
        }
        SymbolKind::Property => !symbol.modifiers.is_override && !symbol.modifiers.is_virtual,
        SymbolKind::Field => true,
        _ => false,
    }
}

fn is_framework_type(
    state: &LoadedState,
    symbol: &SymbolRecord,
    options: &DeadCodeOptions,
) -> bool {
    if !symbol.kind.is_type() {
        return false;
    }
    let mut hierarchy: Vec<String> = symbol.base_types.clone();
    hierarchy.extend(navigate::base_chain(state, symbol.id));
    hierarchy.extend(navigate::all_interfaces(state, symbol.id));
    let base_hit = hierarchy.iter().any(|name| {
        let folded = name.to_lowercase();
        FRAMEWORK_BASE_MARKERS
            .iter()
            .map(|m| m.to_lowercase())
            .chain(options.extra_base_markers.iter().map(|m| m.to_lowercase()))
            .any(|marker| folded.contains(&marker))
    });
    if base_hit {
        return true;
    }
    symbol.attributes.iter().any(|attr| {
        let folded = attr.to_lowercase();
        FRAMEWORK_ATTRIBUTE_MARKERS
            .iter()
            .map(|m| m.to_lowercase())
            .chain(
                options
                    .extra_attribute_markers
                    .iter()
                    .map(|m| m.to_lowercase()),
            )
            .any(|marker| folded.contains(&marker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_lists_contain_contract_entries() {
        assert!(FRAMEWORK_BASE_MARKERS.contains(&"IHostedService"));
        assert!(FRAMEWORK_BASE_MARKERS.contains(&"DbContext"));
        assert!(FRAMEWORK_ATTRIBUTE_MARKERS.contains(&"Controller"));
        assert!(FRAMEWORK_ATTRIBUTE_MARKERS.contains(&"Fact"));
    }
}
