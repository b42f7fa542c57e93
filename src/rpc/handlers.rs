//! Handler functions for the tool catalog. Each corresponds to one match
//! arm in `handle_method`.

use super::*;
use crate::deadcode::{self, DeadCodeOptions};
use crate::depgraph;
use crate::diagnostics::{self, Scope};
use crate::model::{EditPlan, Reference, Severity, SymbolKind};
use crate::navigate;
use crate::refactor::{self, codefix, extract_interface, format, plan, rename, usings, Verbosity};
use crate::search::{self, NameMatcher, SemanticFilters};
use crate::semantics::refs::RefHit;
use crate::semantics::{self, SymbolRecord};
use crate::syntax::{self, Binding, ResolveFailure, Resolution};
use crate::util::{self, Deadline};
use crate::workspace::{DocKey, LoadedState, LookupError};
use serde_json::Map;
use std::path::Path;

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn deadline(core: &Core) -> Deadline {
    Deadline::new(core.workspace.config().timeout_seconds)
}

enum PositionOutcome {
    Bound(DocKey, Resolution),
    Payload(Value),
}

fn resolve_at(core: &mut Core, file_path: &str, line: i64, column: i64) -> PositionOutcome {
    let key = match core.workspace.document(file_path) {
        Ok(key) => key,
        Err(LookupError::NoSolution) => return PositionOutcome::Payload(no_solution_payload()),
        Err(LookupError::NotFound(path)) => {
            return PositionOutcome::Payload(file_not_in_solution(&path))
        }
    };
    let Some(state) = core.workspace.loaded() else {
        return PositionOutcome::Payload(no_solution_payload());
    };
    match syntax::resolve_position(state, key, line, column) {
        Ok(resolution) => PositionOutcome::Bound(key, resolution),
        Err(ResolveFailure::InvalidPosition {
            line,
            column,
            line_count,
        }) => PositionOutcome::Payload(invalid_position(line, column, line_count)),
        Err(ResolveFailure::NotFound(info)) => PositionOutcome::Payload(json!({
            "error": "SymbolNotFound",
            "requestedPosition": { "filePath": file_path, "line": line, "column": column },
            "foundToken": { "text": info.token_text, "kind": info.token_kind },
            "nodeKind": info.node_kind,
            "strategiesAttempted": info.strategies,
            "hint": info.hint,
        })),
    }
}

/// Document lookup without symbol resolution, for handlers that work on the
/// position itself.
fn lookup_document(core: &mut Core, file_path: &str) -> Result<DocKey, Value> {
    match core.workspace.document(file_path) {
        Ok(key) => Ok(key),
        Err(LookupError::NoSolution) => Err(no_solution_payload()),
        Err(LookupError::NotFound(path)) => Err(file_not_in_solution(&path)),
    }
}

fn require_source(resolution: &Resolution) -> Result<usize, Value> {
    match &resolution.binding {
        Binding::Source(id) => Ok(*id),
        Binding::External(name) => Err(metadata_symbol(name)),
    }
}

fn truncation_hint(shown: usize, total: usize, parameter: &str) -> Option<String> {
    (total > shown).then(|| format!("showing {shown} of {total}; increase {parameter}"))
}

fn symbol_summary(state: &LoadedState, id: usize) -> Value {
    let symbol = state.index.symbol(id);
    json!({
        "name": symbol.name,
        "kind": symbol.kind,
        "fullyQualifiedName": symbol.display,
        "accessibility": symbol.accessibility,
        "location": state.index.primary_location(&state.solution, id),
    })
}

fn reference_value(state: &LoadedState, hit: &RefHit) -> Value {
    let doc = state.solution.document(hit.doc);
    let excerpt = util::line_text(&doc.text, hit.span.start_line)
        .map(util::excerpt)
        .unwrap_or_default();
    json!(Reference {
        file_path: semantics::doc_path(&state.solution, hit.doc),
        line: hit.span.start_line,
        column: hit.span.start_col,
        excerpt,
        kind: "read",
    })
}

fn with_plan(plan: &EditPlan, extra: Value) -> Value {
    let mut obj = serde_json::to_value(plan).unwrap_or_else(|_| json!({}));
    if let (Value::Object(target), Value::Object(source)) = (&mut obj, extra) {
        for (key, value) in source {
            target.insert(key, value);
        }
    }
    obj
}

fn apply_outcome(report: &refactor::ApplyReport) -> Value {
    json!({
        "applied": true,
        "success": report.succeeded(),
        "firstFailure": report.first_failure,
        "files": report.files,
    })
}

// ---------------------------------------------------------------------------
// GROUP 1 -- Workspace handlers
// ---------------------------------------------------------------------------

pub(super) fn handle_health_check(core: &mut Core, _params: Value) -> Result<Value> {
    let config = core.workspace.config();
    let configuration = json!({
        "logLevel": config.log_level.as_str(),
        "semanticCacheEnabled": config.semantic_cache_enabled,
        "maxDiagnostics": config.max_diagnostics,
        "timeoutSeconds": config.timeout_seconds,
    });
    let capabilities = json!({
        "transport": "stdio",
        "languages": ["C#"],
        "tools": tool_names().len(),
    });
    match core.workspace.loaded() {
        Some(state) => Ok(json!({
            "status": "Ready",
            "solution": {
                "path": state.solution.path.display().to_string(),
                "loadedAtEpochSeconds": state.solution.loaded_at_epoch_secs(),
                "projectCount": state.solution.projects.len(),
                "documentCount": state.solution.document_count(),
                "symbolCount": state.index.symbols.len(),
            },
            "workspace": {
                "cacheEnabled": state.cache_enabled(),
                "cachedDocuments": state.cache_len(),
            },
            "capabilities": capabilities,
            "configuration": configuration,
        })),
        None => Ok(json!({
            "status": "Not Ready",
            "message": "no solution loaded; call load_solution or set SOLUTION_PATH",
            "capabilities": capabilities,
            "configuration": configuration,
        })),
    }
}

pub(super) fn handle_load_solution(core: &mut Core, params: Value) -> Result<Value> {
    let params: LoadSolutionParams = parse_params(params)?;
    let summary = core.workspace.load(Path::new(&params.solution_path))?;
    Ok(json!({
        "success": true,
        "projectCount": summary.project_count,
        "documentCount": summary.document_count,
    }))
}

pub(super) fn handle_get_project_structure(core: &mut Core, params: Value) -> Result<Value> {
    let params: ProjectStructureParams = parse_params(params)?;
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let include_references = params.include_references.unwrap_or(true);
    let include_documents = params.include_documents.unwrap_or(false);
    let summary_only = params.summary_only.unwrap_or(false);
    let max_projects = params
        .max_projects
        .unwrap_or(100)
        .min(MAX_RESPONSE_LIMIT);
    let matcher = params
        .project_name_pattern
        .as_deref()
        .map(NameMatcher::glob)
        .transpose()
        .map_err(|err| anyhow::anyhow!("invalid params: {err}"))?;

    let selected: Vec<(usize, &crate::workspace::Project)> = state
        .solution
        .projects
        .iter()
        .enumerate()
        .filter(|(_, p)| matcher.as_ref().map(|m| m.matches(&p.name)).unwrap_or(true))
        .collect();
    let total = selected.len();

    if summary_only {
        let document_count: usize = selected.iter().map(|(_, p)| p.documents.len()).sum();
        return Ok(json!({
            "solutionPath": state.solution.path.display().to_string(),
            "projectCount": total,
            "documentCount": document_count,
        }));
    }

    let projects: Vec<Value> = selected
        .iter()
        .take(max_projects)
        .map(|(_, project)| {
            let mut obj = Map::new();
            obj.insert("name".into(), json!(project.name));
            obj.insert("path".into(), json!(project.path.display().to_string()));
            obj.insert("language".into(), json!(project.language));
            obj.insert("documentCount".into(), json!(project.documents.len()));
            if include_references {
                let refs: Vec<&str> = project
                    .project_refs
                    .iter()
                    .map(|r| r.display_name())
                    .collect();
                obj.insert("projectReferences".into(), json!(refs));
                let packages: Vec<Value> = project
                    .package_refs
                    .iter()
                    .map(|p| json!({ "name": p.name, "version": p.version }))
                    .collect();
                obj.insert("packageReferences".into(), json!(packages));
            }
            if include_documents {
                let docs: Vec<Value> = project
                    .documents
                    .iter()
                    .map(|d| {
                        json!({
                            "name": d.name,
                            "folders": d.folders,
                            "path": d.path.as_ref().map(|p| p.display().to_string()),
                        })
                    })
                    .collect();
                obj.insert("documents".into(), json!(docs));
            }
            Value::Object(obj)
        })
        .collect();

    Ok(json!({
        "solutionPath": state.solution.path.display().to_string(),
        "projectCount": total,
        "projectsShown": projects.len(),
        "truncated": total > projects.len(),
        "projects": projects,
    }))
}

// ---------------------------------------------------------------------------
// GROUP 2 -- Position-based symbol handlers
// ---------------------------------------------------------------------------

pub(super) fn handle_get_symbol_info(core: &mut Core, params: Value) -> Result<Value> {
    let params: PositionParams = parse_params(params)?;
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let resolution_value = json!({
        "foundVia": resolution.found_via,
        "tokenText": resolution.token_text,
        "tokenKind": resolution.token_kind,
        "nodeKind": resolution.node_kind,
    });
    match &resolution.binding {
        Binding::External(name) => {
            let mut payload = metadata_symbol(name);
            if let Value::Object(obj) = &mut payload {
                obj.insert("resolution".into(), resolution_value);
            }
            Ok(payload)
        }
        Binding::Source(id) => {
            let symbol = state.index.symbol(*id);
            let mut detail = symbol_detail(state, symbol);
            if let Value::Object(obj) = &mut detail {
                obj.insert("resolution".into(), resolution_value);
            }
            Ok(detail)
        }
    }
}

fn symbol_detail(state: &LoadedState, symbol: &SymbolRecord) -> Value {
    let mut obj = Map::new();
    obj.insert("name".into(), json!(symbol.name));
    obj.insert("kind".into(), json!(symbol.kind));
    obj.insert("fullyQualifiedName".into(), json!(symbol.display));
    obj.insert("qualifiedName".into(), json!(symbol.qualified_name));
    obj.insert("namespace".into(), json!(symbol.namespace));
    obj.insert("containingType".into(), json!(symbol.container));
    obj.insert("accessibility".into(), json!(symbol.accessibility));
    obj.insert(
        "modifiers".into(),
        json!({
            "isStatic": symbol.modifiers.is_static,
            "isAsync": symbol.modifiers.is_async,
            "isAbstract": symbol.modifiers.is_abstract,
            "isVirtual": symbol.modifiers.is_virtual,
            "isOverride": symbol.modifiers.is_override,
            "isSealed": symbol.modifiers.is_sealed,
            "isReadonly": symbol.modifiers.is_readonly,
            "isPartial": symbol.modifiers.is_partial,
            "isExtension": symbol.modifiers.is_extension,
            "isConst": symbol.modifiers.is_const,
        }),
    );
    if !symbol.attributes.is_empty() {
        obj.insert("attributes".into(), json!(symbol.attributes));
    }
    if let Some(signature) = &symbol.signature {
        obj.insert("signature".into(), json!(signature));
    }
    obj.insert(
        "locations".into(),
        json!(state.index.all_locations(&state.solution, symbol.id)),
    );
    match symbol.kind {
        SymbolKind::Method | SymbolKind::Delegate => {
            let params: Vec<Value> = symbol
                .parameters
                .iter()
                .map(|p| json!({ "name": p.name, "type": p.type_display }))
                .collect();
            obj.insert("parameters".into(), json!(params));
            obj.insert("returnType".into(), json!(symbol.return_type));
            obj.insert("isConstructor".into(), json!(symbol.is_constructor));
        }
        SymbolKind::Property | SymbolKind::Field | SymbolKind::Event
        | SymbolKind::Parameter | SymbolKind::Local => {
            obj.insert("type".into(), json!(symbol.type_display));
        }
        SymbolKind::Class | SymbolKind::Struct | SymbolKind::Interface | SymbolKind::Enum => {
            obj.insert("baseTypes".into(), json!(symbol.base_types));
        }
        SymbolKind::Namespace => {}
    }
    Value::Object(obj)
}

pub(super) fn handle_go_to_definition(core: &mut Core, params: Value) -> Result<Value> {
    let params: PositionParams = parse_params(params)?;
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    match require_source(&resolution) {
        Err(payload) => Ok(payload),
        Ok(id) => {
            let symbol = state.index.symbol(id);
            Ok(json!({
                "symbolName": symbol.name,
                "kind": symbol.kind,
                "location": state.index.primary_location(&state.solution, id),
            }))
        }
    }
}

pub(super) fn handle_find_references(core: &mut Core, params: Value) -> Result<Value> {
    let params: ListAtPositionParams = parse_params(params)?;
    let limit = deadline(core);
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let max_results = params.max_results.unwrap_or(100).min(MAX_RESPONSE_LIMIT);
    let hits = crate::semantics::refs::find_references(&state.solution, &state.index, id, &limit)?;
    let total = hits.len();
    let shown: Vec<Value> = hits
        .iter()
        .take(max_results)
        .map(|hit| reference_value(state, hit))
        .collect();
    let symbol = state.index.symbol(id);
    Ok(json!({
        "symbolName": symbol.name,
        "symbolKind": symbol.kind,
        "totalReferences": total,
        "referencesShown": shown.len(),
        "truncated": total > shown.len(),
        "references": shown,
        "hint": truncation_hint(shown.len(), total, "maxResults"),
    }))
}

pub(super) fn handle_find_implementations(core: &mut Core, params: Value) -> Result<Value> {
    let params: ListAtPositionParams = parse_params(params)?;
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let symbol = state.index.symbol(id);
    if !matches!(symbol.kind, SymbolKind::Interface | SymbolKind::Class) {
        return Ok(wrong_symbol_kind(
            &symbol.name,
            symbol.kind.as_str(),
            "an interface or class",
        ));
    }
    let max_results = params.max_results.unwrap_or(50).min(MAX_RESPONSE_LIMIT);
    let implementations = navigate::implementations(state, id);
    let total = implementations.len();
    let shown: Vec<Value> = implementations
        .iter()
        .take(max_results)
        .map(|&impl_id| symbol_summary(state, impl_id))
        .collect();
    Ok(json!({
        "symbolName": symbol.name,
        "symbolKind": symbol.kind,
        "totalImplementations": total,
        "implementationsShown": shown.len(),
        "truncated": total > shown.len(),
        "implementations": shown,
        "hint": truncation_hint(shown.len(), total, "maxResults"),
    }))
}

pub(super) fn handle_find_callers(core: &mut Core, params: Value) -> Result<Value> {
    let params: ListAtPositionParams = parse_params(params)?;
    let limit = deadline(core);
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let symbol = state.index.symbol(id);
    if !matches!(symbol.kind, SymbolKind::Method | SymbolKind::Property) {
        return Ok(wrong_symbol_kind(
            &symbol.name,
            symbol.kind.as_str(),
            "a method or property",
        ));
    }
    let max_results = params.max_results.unwrap_or(50).min(MAX_RESPONSE_LIMIT);
    let groups = navigate::callers(&state.solution, &state.index, id, &limit)?;
    let total = groups.len();
    let shown: Vec<Value> = groups
        .iter()
        .take(max_results)
        .map(|group| {
            let sites: Vec<Value> = group
                .sites
                .iter()
                .map(|hit| reference_value(state, hit))
                .collect();
            json!({
                "caller": group.caller.map(|caller| symbol_summary(state, caller)),
                "callSites": sites,
            })
        })
        .collect();
    Ok(json!({
        "symbolName": symbol.name,
        "symbolKind": symbol.kind,
        "totalCallers": total,
        "callersShown": shown.len(),
        "truncated": total > shown.len(),
        "callers": shown,
        "hint": truncation_hint(shown.len(), total, "maxResults"),
    }))
}

pub(super) fn handle_get_type_hierarchy(core: &mut Core, params: Value) -> Result<Value> {
    let params: TypeHierarchyParams = parse_params(params)?;
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let symbol = state.index.symbol(id);
    if !symbol.kind.is_type() {
        return Ok(wrong_symbol_kind(
            &symbol.name,
            symbol.kind.as_str(),
            "a named type",
        ));
    }
    let max_derived = params
        .max_derived_types
        .unwrap_or(50)
        .min(MAX_RESPONSE_LIMIT);
    let derived = navigate::derived_types(state, id);
    let total = derived.len();
    let shown: Vec<Value> = derived
        .iter()
        .take(max_derived)
        .map(|&derived_id| symbol_summary(state, derived_id))
        .collect();
    Ok(json!({
        "typeName": symbol.display,
        "kind": symbol.kind,
        "baseTypes": navigate::base_chain(state, id),
        "interfaces": navigate::all_interfaces(state, id),
        "totalDerivedTypes": total,
        "derivedTypes": shown,
        "truncated": total > shown.len(),
        "hint": truncation_hint(shown.len(), total, "maxDerivedTypes"),
    }))
}

pub(super) fn handle_get_method_overloads(core: &mut Core, params: Value) -> Result<Value> {
    let params: PositionParams = parse_params(params)?;
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let symbol = state.index.symbol(id);
    if symbol.kind != SymbolKind::Method || symbol.is_constructor {
        return Ok(wrong_symbol_kind(
            &symbol.name,
            symbol.kind.as_str(),
            "an ordinary method",
        ));
    }
    let overloads: Vec<Value> = navigate::overloads(&state.index, id)
        .into_iter()
        .map(|overload_id| {
            let overload = state.index.symbol(overload_id);
            json!({
                "name": overload.name,
                "signature": overload.signature,
                "returnType": overload.return_type,
                "parameters": overload
                    .parameters
                    .iter()
                    .map(|p| json!({ "name": p.name, "type": p.type_display }))
                    .collect::<Vec<_>>(),
                "isStatic": overload.modifiers.is_static,
                "isAsync": overload.modifiers.is_async,
                "location": state.index.primary_location(&state.solution, overload_id),
            })
        })
        .collect();
    Ok(json!({
        "methodName": symbol.name,
        "containingType": symbol.container,
        "totalOverloads": overloads.len(),
        "overloads": overloads,
    }))
}

pub(super) fn handle_get_containing_member(core: &mut Core, params: Value) -> Result<Value> {
    let params: PositionParams = parse_params(params)?;
    let key = match lookup_document(core, &params.file_path) {
        Ok(key) => key,
        Err(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let doc = state.solution.document(key);
    if params.line < 0 || params.column < 0 {
        return Ok(invalid_position(
            params.line,
            params.column,
            doc.text.split('\n').count(),
        ));
    }
    let Some(offset) =
        util::offset_for_position(&doc.text, params.line as usize, params.column as usize)
    else {
        return Ok(invalid_position(
            params.line,
            params.column,
            doc.text.split('\n').count(),
        ));
    };
    let kinds = [
        SymbolKind::Method,
        SymbolKind::Property,
        SymbolKind::Class,
        SymbolKind::Struct,
        SymbolKind::Interface,
    ];
    let Some(member_id) = state.index.enclosing_declaration(key, offset, &kinds) else {
        return Ok(json!({
            "error": "NoContainingMember",
            "hint": "the position is not inside a member declaration",
        }));
    };
    let member = state.index.symbol(member_id);
    Ok(json!({
        "name": member.name,
        "kind": member.kind,
        "fullyQualifiedName": member.display,
        "accessibility": member.accessibility,
        "isConstructor": member.is_constructor,
        "signature": member.signature,
        "span": {
            "startLine": member.decl_span.start_line,
            "startColumn": member.decl_span.start_col,
            "endLine": member.decl_span.end_line,
            "endColumn": member.decl_span.end_col,
        },
        "location": state.index.primary_location(&state.solution, member_id),
    }))
}

// ---------------------------------------------------------------------------
// GROUP 3 -- Search handlers
// ---------------------------------------------------------------------------

pub(super) fn handle_search_symbols(core: &mut Core, params: Value) -> Result<Value> {
    let params: SearchSymbolsParams = parse_params(params)?;
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let max_results = params.max_results.unwrap_or(50).min(MAX_RESPONSE_LIMIT);
    let offset = params.offset.unwrap_or(0);
    let page = search::search_symbols(
        &state.index,
        &params.query,
        params.kind.as_deref(),
        params.namespace_filter.as_deref(),
        max_results,
        offset,
    )
    .map_err(|err| anyhow::anyhow!("invalid params: {err}"))?;
    let results: Vec<Value> = page
        .ids
        .iter()
        .map(|&id| symbol_summary(state, id))
        .collect();
    let count = results.len();
    Ok(json!({
        "query": params.query,
        "totalCount": page.total_observed,
        "offset": offset,
        "count": count,
        "hasMore": page.has_more,
        "results": results,
        "pagination": {
            "nextOffset": if page.has_more { json!(offset + count) } else { Value::Null },
        },
    }))
}

pub(super) fn handle_semantic_query(core: &mut Core, params: Value) -> Result<Value> {
    let params: SemanticQueryParams = parse_params(params)?;
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let filters = SemanticFilters {
        kinds: params.kinds,
        is_async: params.is_async,
        is_static: params.is_static,
        namespace_filter: params.namespace_filter,
        accessibility: params.accessibility,
        type_filter: params.type_filter,
        return_type: params.return_type,
        attributes: params.attributes,
        parameter_includes: params.parameter_includes,
        parameter_excludes: params.parameter_excludes,
    };
    let matches = search::semantic_query(&state.index, &filters)
        .map_err(|err| anyhow::anyhow!("invalid params: {err}"))?;
    let max_results = params.max_results.unwrap_or(100).min(MAX_RESPONSE_LIMIT);
    let mut by_kind: std::collections::BTreeMap<&'static str, usize> =
        std::collections::BTreeMap::new();
    for &id in &matches {
        *by_kind
            .entry(state.index.symbol(id).kind.as_str())
            .or_default() += 1;
    }
    let total = matches.len();
    let results: Vec<Value> = matches
        .iter()
        .take(max_results)
        .map(|&id| symbol_summary(state, id))
        .collect();
    Ok(json!({
        "totalMatches": total,
        "shown": results.len(),
        "truncated": total > results.len(),
        "byKind": by_kind,
        "results": results,
        "hint": truncation_hint(results.len(), total, "maxResults"),
    }))
}

// ---------------------------------------------------------------------------
// GROUP 4 -- Diagnostics and code fixes
// ---------------------------------------------------------------------------

pub(super) fn handle_get_diagnostics(core: &mut Core, params: Value) -> Result<Value> {
    let params: DiagnosticsParams = parse_params(params)?;
    let severity = match params.severity.as_deref() {
        Some(raw) => Some(
            Severity::parse(raw)
                .ok_or_else(|| anyhow::anyhow!("invalid params: unknown severity '{raw}'"))?,
        ),
        None => None,
    };

    let scope = if let Some(file_path) = &params.file_path {
        match lookup_document(core, file_path) {
            Ok(key) => Scope::File(key),
            Err(payload) => return Ok(payload),
        }
    } else if let Some(project_path) = &params.project_path {
        let Some(state) = core.workspace.loaded() else {
            return Ok(no_solution_payload());
        };
        let canonical = util::canonical_path(Path::new(project_path));
        match state
            .solution
            .projects
            .iter()
            .position(|p| p.canonical_path == canonical)
        {
            Some(project) => Scope::Project(project),
            None => {
                return Ok(json!({
                    "error": "ProjectNotFound",
                    "projectPath": project_path,
                    "hint": "projectPath must exactly match a loaded project file path",
                }))
            }
        }
    } else {
        Scope::Solution
    };

    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let max = core.workspace.config().max_diagnostics;
    let report = diagnostics::collect(
        state,
        scope,
        severity,
        params.include_hidden.unwrap_or(false),
        max,
    );
    let scope_name = match scope {
        Scope::File(_) => "file",
        Scope::Project(_) => "project",
        Scope::Solution => "solution",
    };
    Ok(json!({
        "scope": scope_name,
        "total": report.total,
        "shown": report.diagnostics.len(),
        "truncated": report.truncated,
        "diagnostics": report.diagnostics,
        "summary": {
            "errors": report.error_count,
            "warnings": report.warning_count,
        },
    }))
}

pub(super) fn handle_get_code_fixes(core: &mut Core, params: Value) -> Result<Value> {
    let params: CodeFixParams = parse_params(params)?;
    let key = match lookup_document(core, &params.file_path) {
        Ok(key) => key,
        Err(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let doc = state.solution.document(key);
    let offset = if params.line >= 0 && params.column >= 0 {
        util::offset_for_position(&doc.text, params.line as usize, params.column as usize)
    } else {
        None
    };
    match codefix::discover(state, key, &params.diagnostic_id, offset) {
        codefix::Discovery::Found {
            diagnostic,
            matched_by,
            fixes,
        } => {
            let fix_list: Vec<Value> = fixes
                .iter()
                .map(|fix| {
                    json!({
                        "index": fix.index,
                        "provider": fix.provider,
                        "title": fix.action.title,
                    })
                })
                .collect();
            Ok(json!({
                "diagnostic": diagnostic,
                "matchedBy": matched_by,
                "totalFixes": fix_list.len(),
                "fixes": fix_list,
            }))
        }
        codefix::Discovery::NoMatch { nearest } => Ok(json!({
            "error": "DiagnosticNotFound",
            "diagnosticId": params.diagnostic_id,
            "hint": "no matching diagnostic at or near the position; nearest candidates follow",
            "nearestDiagnostics": nearest,
        })),
    }
}

pub(super) fn handle_apply_code_fix(core: &mut Core, params: Value) -> Result<Value> {
    let params: ApplyCodeFixParams = parse_params(params)?;
    let key = match lookup_document(core, &params.file_path) {
        Ok(key) => key,
        Err(payload) => return Ok(payload),
    };
    let preview = params.preview.unwrap_or(true);
    let fix_index = params.fix_index.unwrap_or(0);

    let changes = {
        let Some(state) = core.workspace.loaded() else {
            return Ok(no_solution_payload());
        };
        let doc = state.solution.document(key);
        let offset = if params.line >= 0 && params.column >= 0 {
            util::offset_for_position(&doc.text, params.line as usize, params.column as usize)
        } else {
            None
        };
        match codefix::discover(state, key, &params.diagnostic_id, offset) {
            codefix::Discovery::NoMatch { nearest } => {
                return Ok(json!({
                    "error": "DiagnosticNotFound",
                    "diagnosticId": params.diagnostic_id,
                    "nearestDiagnostics": nearest,
                }))
            }
            codefix::Discovery::Found { fixes, .. } => {
                if fixes.is_empty() {
                    return Ok(json!({
                        "error": "NoFixAvailable",
                        "diagnosticId": params.diagnostic_id,
                        "hint": "no registered provider offers a fix for this diagnostic",
                    }));
                }
                let Some(fix) = fixes.get(fix_index) else {
                    return Ok(json!({
                        "error": "FixIndexOutOfRange",
                        "fixIndex": fix_index,
                        "totalFixes": fixes.len(),
                        "hint": "call get_code_fixes to list available fix indexes",
                    }));
                };
                codefix::changes_for(state, &fix.action)
            }
        }
    };

    let edit_plan = plan::build_plan(&changes, Verbosity::Full, None);
    if preview {
        return Ok(with_plan(
            &edit_plan,
            json!({ "preview": true, "applied": false }),
        ));
    }
    let report = refactor::commit(&mut core.workspace, &changes)?;
    Ok(with_plan(&edit_plan, apply_outcome(&report)))
}

// ---------------------------------------------------------------------------
// GROUP 5 -- Refactoring handlers
// ---------------------------------------------------------------------------

pub(super) fn handle_rename_symbol(core: &mut Core, params: Value) -> Result<Value> {
    let params: RenameParams = parse_params(params)?;
    let limit = deadline(core);
    if !rename::is_valid_identifier(&params.new_name) {
        return Ok(json!({
            "error": "InvalidName",
            "newName": params.new_name,
            "hint": "newName must be a valid C# identifier",
        }));
    }
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let preview = params.preview.unwrap_or(true);
    let verbosity = Verbosity::parse(params.verbosity.as_deref());

    let (symbol_name, changes) = {
        let Some(state) = core.workspace.loaded() else {
            return Ok(no_solution_payload());
        };
        let id = match require_source(&resolution) {
            Ok(id) => id,
            Err(payload) => return Ok(payload),
        };
        let (primary, changes) = rename::plan_rename(state, id, &params.new_name, &limit)?;
        (state.index.symbol(primary).name.clone(), changes)
    };

    let edit_plan = plan::build_plan(&changes, verbosity, params.max_files);
    if preview {
        return Ok(with_plan(
            &edit_plan,
            json!({
                "preview": true,
                "applied": false,
                "symbolName": symbol_name,
                "newName": params.new_name,
            }),
        ));
    }
    let report = refactor::commit(&mut core.workspace, &changes)?;
    let mut outcome = apply_outcome(&report);
    if let Value::Object(obj) = &mut outcome {
        obj.insert("symbolName".into(), json!(symbol_name));
        obj.insert("newName".into(), json!(params.new_name));
    }
    Ok(with_plan(&edit_plan, outcome))
}

pub(super) fn handle_organize_usings(core: &mut Core, params: Value) -> Result<Value> {
    let params: OrganizeUsingsParams = parse_params(params)?;
    let key = match lookup_document(core, &params.file_path) {
        Ok(key) => key,
        Err(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let doc = state.solution.document(key);
    let organized = usings::organize_text(&doc.tree, &doc.text);
    let changed = organized
        .as_ref()
        .map(|text| text != &doc.text)
        .unwrap_or(false);
    Ok(json!({
        "filePath": params.file_path,
        "changed": changed,
        "newText": organized.unwrap_or_else(|| doc.text.clone()),
    }))
}

fn project_selection(
    state: &LoadedState,
    project_name: Option<&str>,
) -> Result<Vec<usize>, Value> {
    match project_name {
        None => Ok((0..state.solution.projects.len()).collect()),
        Some(name) => {
            let found: Vec<usize> = state
                .solution
                .projects
                .iter()
                .enumerate()
                .filter(|(_, p)| p.name == name)
                .map(|(idx, _)| idx)
                .collect();
            if found.is_empty() {
                Err(json!({
                    "error": "ProjectNotFound",
                    "projectName": name,
                    "hint": "projectName must exactly match a loaded project",
                }))
            } else {
                Ok(found)
            }
        }
    }
}

pub(super) fn handle_organize_usings_batch(core: &mut Core, params: Value) -> Result<Value> {
    let params: OrganizeUsingsBatchParams = parse_params(params)?;
    let preview = params.preview.unwrap_or(true);
    let file_matcher = params
        .file_pattern
        .as_deref()
        .map(NameMatcher::glob)
        .transpose()
        .map_err(|err| anyhow::anyhow!("invalid params: {err}"))?;

    let changes = {
        let Some(state) = core.workspace.loaded() else {
            return Ok(no_solution_payload());
        };
        let projects = match project_selection(state, params.project_name.as_deref()) {
            Ok(projects) => projects,
            Err(payload) => return Ok(payload),
        };
        let mut changes = Vec::new();
        for key in state.solution.doc_keys() {
            if !projects.contains(&key.project) {
                continue;
            }
            let doc = state.solution.document(key);
            if let Some(matcher) = &file_matcher {
                if !matcher.matches(&doc.name) {
                    continue;
                }
            }
            let Some(path) = doc.path.clone() else {
                continue;
            };
            if let Some(new_text) = usings::organize_text(&doc.tree, &doc.text) {
                if new_text != doc.text {
                    changes.push(refactor::PendingChange {
                        path,
                        change_type: crate::model::ChangeType::Modified,
                        old_text: doc.text.clone(),
                        new_text: Some(new_text),
                    });
                }
            }
        }
        changes
    };

    let edit_plan = plan::build_plan(&changes, Verbosity::Compact, None);
    if preview {
        return Ok(with_plan(
            &edit_plan,
            json!({ "preview": true, "applied": false }),
        ));
    }
    let report = refactor::commit(&mut core.workspace, &changes)?;
    Ok(with_plan(&edit_plan, apply_outcome(&report)))
}

pub(super) fn handle_format_document_batch(core: &mut Core, params: Value) -> Result<Value> {
    let params: FormatBatchParams = parse_params(params)?;
    let preview = params.preview.unwrap_or(true);
    let include_tests = params.include_tests.unwrap_or(true);

    let changes = {
        let Some(state) = core.workspace.loaded() else {
            return Ok(no_solution_payload());
        };
        let projects = match project_selection(state, params.project_name.as_deref()) {
            Ok(projects) => projects,
            Err(payload) => return Ok(payload),
        };
        let mut changes = Vec::new();
        for key in state.solution.doc_keys() {
            if !projects.contains(&key.project) {
                continue;
            }
            let project = &state.solution.projects[key.project];
            if !include_tests && project.name.to_lowercase().contains("test") {
                continue;
            }
            let doc = state.solution.document(key);
            let Some(path) = doc.path.clone() else {
                continue;
            };
            let formatted = format::normalize_whitespace(&doc.text);
            if formatted != doc.text {
                changes.push(refactor::PendingChange {
                    path,
                    change_type: crate::model::ChangeType::Modified,
                    old_text: doc.text.clone(),
                    new_text: Some(formatted),
                });
            }
        }
        changes
    };

    let edit_plan = plan::build_plan(&changes, Verbosity::Compact, None);
    if preview {
        return Ok(with_plan(
            &edit_plan,
            json!({ "preview": true, "applied": false }),
        ));
    }
    let report = refactor::commit(&mut core.workspace, &changes)?;
    Ok(with_plan(&edit_plan, apply_outcome(&report)))
}

pub(super) fn handle_extract_interface(core: &mut Core, params: Value) -> Result<Value> {
    let params: ExtractInterfaceParams = parse_params(params)?;
    if !rename::is_valid_identifier(&params.interface_name) {
        return Ok(json!({
            "error": "InvalidName",
            "interfaceName": params.interface_name,
            "hint": "interfaceName must be a valid C# identifier",
        }));
    }
    let resolution = match resolve_at(core, &params.file_path, params.line, params.column) {
        PositionOutcome::Bound(_, resolution) => resolution,
        PositionOutcome::Payload(payload) => return Ok(payload),
    };
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let id = match require_source(&resolution) {
        Ok(id) => id,
        Err(payload) => return Ok(payload),
    };
    let symbol = state.index.symbol(id);
    if !matches!(symbol.kind, SymbolKind::Class | SymbolKind::Struct) {
        return Ok(wrong_symbol_kind(
            &symbol.name,
            symbol.kind.as_str(),
            "a class or struct",
        ));
    }
    let extracted = extract_interface::extract(
        &state.index,
        id,
        &params.interface_name,
        params.include_member_names.as_deref(),
    );
    Ok(json!({
        "interfaceName": extracted.interface_name,
        "suggestedFileName": extracted.suggested_file_name,
        "interfaceText": extracted.text,
        "memberCount": extracted.member_count,
        "sourceType": symbol.display,
    }))
}

// ---------------------------------------------------------------------------
// GROUP 6 -- Analysis handlers
// ---------------------------------------------------------------------------

pub(super) fn handle_find_unused_code(core: &mut Core, params: Value) -> Result<Value> {
    let params: UnusedCodeParams = parse_params(params)?;
    let limit = deadline(core);
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let symbol_kind_filter = match params.symbol_kind_filter.as_deref() {
        Some(raw) => Some(
            SymbolKind::parse(raw)
                .ok_or_else(|| anyhow::anyhow!("invalid params: unknown symbol kind '{raw}'"))?,
        ),
        None => None,
    };
    let mut options = DeadCodeOptions::new();
    options.project_name = params.project_name;
    if let Some(include_private) = params.include_private {
        options.include_private = include_private;
    }
    if let Some(include_internal) = params.include_internal {
        options.include_internal = include_internal;
    }
    options.symbol_kind_filter = symbol_kind_filter;
    options.max_results = params.max_results.unwrap_or(50).min(MAX_RESPONSE_LIMIT);

    let report = match deadcode::analyze(state, &options, &limit) {
        Ok(report) => report,
        Err(err) if err.to_string().starts_with("project not found") => {
            return Ok(json!({
                "error": "ProjectNotFound",
                "projectName": options.project_name,
                "hint": "projectName must exactly match a loaded project",
            }))
        }
        Err(err) => return Err(err),
    };
    let items: Vec<Value> = report
        .flagged
        .iter()
        .map(|dead| {
            let mut summary = symbol_summary(state, dead.id);
            if let Value::Object(obj) = &mut summary {
                obj.insert("referenceCount".into(), json!(dead.reference_count));
            }
            summary
        })
        .collect();
    Ok(json!({
        "totalFound": report.total_found,
        "shown": items.len(),
        "truncated": report.truncated,
        "byKind": report.by_kind,
        "unusedSymbols": items,
        "hint": truncation_hint(items.len(), report.total_found, "maxResults"),
    }))
}

pub(super) fn handle_dependency_graph(core: &mut Core, params: Value) -> Result<Value> {
    let params: DependencyGraphParams = parse_params(params)?;
    let Some(state) = core.workspace.loaded() else {
        return Ok(no_solution_payload());
    };
    let graph = depgraph::build(&state.solution);
    let cycles = graph.cycles();
    match params.format.as_deref().unwrap_or("json") {
        "json" => Ok(json!({
            "format": "json",
            "projects": graph.edges,
            "cycles": cycles,
            "hasCycles": !cycles.is_empty(),
        })),
        "mermaid" => Ok(json!({
            "format": "mermaid",
            "diagram": graph.to_mermaid(),
            "cycles": cycles,
            "hasCycles": !cycles.is_empty(),
        })),
        other => anyhow::bail!("invalid params: unknown format '{other}' (use json or mermaid)"),
    }
}
