// Request dispatch. The dispatcher owns a single Core holding the
// workspace; every handler receives it explicitly. Handlers return
// structured payloads for expected misses (no solution, file not found,
// wrong symbol kind) and reserve errors for protocol, parser, and I/O
// faults.

mod handlers;

use crate::config::Config;
use crate::workspace::Workspace;
use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};

/// Hard clamp on any caller-supplied maximum.
pub(crate) const MAX_RESPONSE_LIMIT: usize = 500;

pub struct Core {
    pub workspace: Workspace,
}

impl Core {
    pub fn new(config: Config) -> Self {
        Self {
            workspace: Workspace::new(config),
        }
    }
}

pub fn handle_method(core: &mut Core, method: &str, params: Value) -> Result<Value> {
    match method {
        "health_check" => handlers::handle_health_check(core, params),
        "load_solution" => handlers::handle_load_solution(core, params),
        "get_symbol_info" => handlers::handle_get_symbol_info(core, params),
        "go_to_definition" => handlers::handle_go_to_definition(core, params),
        "find_references" => handlers::handle_find_references(core, params),
        "find_implementations" => handlers::handle_find_implementations(core, params),
        "find_callers" => handlers::handle_find_callers(core, params),
        "get_type_hierarchy" => handlers::handle_get_type_hierarchy(core, params),
        "search_symbols" => handlers::handle_search_symbols(core, params),
        "semantic_query" => handlers::handle_semantic_query(core, params),
        "get_diagnostics" => handlers::handle_get_diagnostics(core, params),
        "get_code_fixes" => handlers::handle_get_code_fixes(core, params),
        "apply_code_fix" => handlers::handle_apply_code_fix(core, params),
        "get_project_structure" => handlers::handle_get_project_structure(core, params),
        "organize_usings" => handlers::handle_organize_usings(core, params),
        "organize_usings_batch" => handlers::handle_organize_usings_batch(core, params),
        "format_document_batch" => handlers::handle_format_document_batch(core, params),
        "get_method_overloads" => handlers::handle_get_method_overloads(core, params),
        "get_containing_member" => handlers::handle_get_containing_member(core, params),
        "find_unused_code" => handlers::handle_find_unused_code(core, params),
        "rename_symbol" => handlers::handle_rename_symbol(core, params),
        "extract_interface" => handlers::handle_extract_interface(core, params),
        "dependency_graph" => handlers::handle_dependency_graph(core, params),
        other => anyhow::bail!("unknown tool: {other}"),
    }
}

pub fn tool_names() -> &'static [&'static str] {
    &[
        "health_check",
        "load_solution",
        "get_symbol_info",
        "go_to_definition",
        "find_references",
        "find_implementations",
        "find_callers",
        "get_type_hierarchy",
        "search_symbols",
        "semantic_query",
        "get_diagnostics",
        "get_code_fixes",
        "apply_code_fix",
        "get_project_structure",
        "organize_usings",
        "organize_usings_batch",
        "format_document_batch",
        "get_method_overloads",
        "get_containing_member",
        "find_unused_code",
        "rename_symbol",
        "extract_interface",
        "dependency_graph",
    ]
}

pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T> {
    serde_json::from_value(params).map_err(|err| anyhow::anyhow!("invalid params: {err}"))
}

/// True when a handler error should surface as InvalidParams rather than
/// InternalError at the protocol boundary.
pub fn is_invalid_params(err: &anyhow::Error) -> bool {
    err.to_string().starts_with("invalid params")
}

// ---------------------------------------------------------------------------
// Typed request parameters. 0-based line/column throughout.
// ---------------------------------------------------------------------------

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoadSolutionParams {
    pub solution_path: String,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PositionParams {
    pub file_path: String,
    pub line: i64,
    pub column: i64,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListAtPositionParams {
    pub file_path: String,
    pub line: i64,
    pub column: i64,
    pub max_results: Option<usize>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TypeHierarchyParams {
    pub file_path: String,
    pub line: i64,
    pub column: i64,
    pub max_derived_types: Option<usize>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchSymbolsParams {
    pub query: String,
    pub kind: Option<String>,
    pub namespace_filter: Option<String>,
    pub max_results: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct SemanticQueryParams {
    pub kinds: Vec<String>,
    pub is_async: Option<bool>,
    pub is_static: Option<bool>,
    pub namespace_filter: Option<String>,
    pub accessibility: Option<String>,
    #[serde(rename = "type")]
    pub type_filter: Option<String>,
    pub return_type: Option<String>,
    pub attributes: Vec<String>,
    pub parameter_includes: Vec<String>,
    pub parameter_excludes: Vec<String>,
    pub max_results: Option<usize>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DiagnosticsParams {
    pub file_path: Option<String>,
    pub project_path: Option<String>,
    pub severity: Option<String>,
    pub include_hidden: Option<bool>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CodeFixParams {
    pub file_path: String,
    pub diagnostic_id: String,
    pub line: i64,
    pub column: i64,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApplyCodeFixParams {
    pub file_path: String,
    pub diagnostic_id: String,
    pub line: i64,
    pub column: i64,
    pub fix_index: Option<usize>,
    pub preview: Option<bool>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct ProjectStructureParams {
    pub include_references: Option<bool>,
    pub include_documents: Option<bool>,
    pub project_name_pattern: Option<String>,
    pub max_projects: Option<usize>,
    pub summary_only: Option<bool>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganizeUsingsParams {
    pub file_path: String,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct OrganizeUsingsBatchParams {
    pub project_name: Option<String>,
    pub file_pattern: Option<String>,
    pub preview: Option<bool>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct FormatBatchParams {
    pub project_name: Option<String>,
    pub include_tests: Option<bool>,
    pub preview: Option<bool>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct UnusedCodeParams {
    pub project_name: Option<String>,
    pub include_private: Option<bool>,
    pub include_internal: Option<bool>,
    pub symbol_kind_filter: Option<String>,
    pub max_results: Option<usize>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenameParams {
    pub file_path: String,
    pub line: i64,
    pub column: i64,
    pub new_name: String,
    pub preview: Option<bool>,
    pub max_files: Option<usize>,
    pub verbosity: Option<String>,
}

#[derive(Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExtractInterfaceParams {
    pub file_path: String,
    pub line: i64,
    pub column: i64,
    pub interface_name: String,
    pub include_member_names: Option<Vec<String>>,
}

#[derive(Deserialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct DependencyGraphParams {
    pub format: Option<String>,
}

// ---------------------------------------------------------------------------
// Structured payloads for expected misses.
// ---------------------------------------------------------------------------

pub(crate) fn no_solution_payload() -> Value {
    json!({
        "error": "NoSolutionLoaded",
        "hint": "call load_solution with a solutionPath first"
    })
}

pub(crate) fn file_not_in_solution(path: &str) -> Value {
    json!({
        "error": "FileNotInSolution",
        "filePath": path,
        "hint": "the path must match a document of the loaded solution; check health_check for the solution root"
    })
}

pub(crate) fn invalid_position(line: i64, column: i64, line_count: usize) -> Value {
    json!({
        "error": "InvalidPosition",
        "line": line,
        "column": column,
        "hint": format!(
            "line and column are 0-based; the document has {line_count} lines"
        )
    })
}

pub(crate) fn wrong_symbol_kind(name: &str, actual: &str, expected: &str) -> Value {
    json!({
        "error": "WrongSymbolKind",
        "symbolName": name,
        "symbolKind": actual,
        "hint": format!("this operation requires {expected}")
    })
}

pub(crate) fn metadata_symbol(name: &str) -> Value {
    json!({
        "error": "SymbolInMetadata",
        "symbolName": name,
        "hint": "the symbol is defined in external metadata, not in solution source"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_match_dispatch_table() {
        let mut core = Core::new(Config::default());
        for name in tool_names() {
            // Every catalog entry dispatches; argument errors are fine here,
            // unknown-tool errors are not.
            let result = handle_method(&mut core, name, json!({}));
            if let Err(err) = result {
                assert!(
                    !err.to_string().starts_with("unknown tool"),
                    "{name} missing from dispatch"
                );
            }
        }
    }

    #[test]
    fn unknown_method_is_an_error() {
        let mut core = Core::new(Config::default());
        let err = handle_method(&mut core, "bogus_tool", json!({})).unwrap_err();
        assert!(err.to_string().contains("unknown tool"));
    }

    #[test]
    fn invalid_params_detection() {
        let err = anyhow::anyhow!("invalid params: missing field");
        assert!(is_invalid_params(&err));
        let err = anyhow::anyhow!("operation exceeded the 30s timeout");
        assert!(!is_invalid_params(&err));
    }
}
