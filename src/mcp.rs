// MCP server over stdio: one JSON-RPC 2.0 object per line in, one per line
// out. Stdout carries protocol messages only; diagnostics go to stderr.

use crate::config::Config;
use crate::logging;
use crate::rpc::{self, Core};
use crate::workspace::solution;
use anyhow::Result;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

/// Hard cap on a single tool response.
const MAX_RESPONSE_BYTES: usize = 512_000;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub fn serve(config: Config) -> Result<()> {
    logging::init(config.log_level);
    let mut core = Core::new(config);
    autoload(&mut core);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(value) => value,
            Err(err) => {
                logging::error(&format!("stdin error: {err}"));
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Value>(&line) {
            Ok(message) => handle_message(&mut core, message),
            Err(err) => Some(jsonrpc_error(
                Value::Null,
                -32700,
                &format!("parse error: {err}"),
            )),
        };
        if let Some(payload) = response {
            writeln!(stdout, "{}", serde_json::to_string(&payload)?)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Load the solution named by SOLUTION_PATH before the read loop starts.
/// Failures are logged; the client can still send an explicit load.
fn autoload(core: &mut Core) {
    let Some(path) = core.workspace.config().solution_path.clone() else {
        return;
    };
    let resolved = match solution::resolve_solution_file(&path) {
        Ok(resolved) => resolved,
        Err(err) => {
            logging::warn(&format!("autoload skipped: {err:#}"));
            return;
        }
    };
    match core.workspace.load(&resolved) {
        Ok(summary) => logging::info(&format!(
            "autoloaded {} ({} projects, {} documents)",
            resolved.display(),
            summary.project_count,
            summary.document_count
        )),
        Err(err) => logging::warn(&format!("autoload failed: {err:#}")),
    }
}

pub fn handle_message(core: &mut Core, message: Value) -> Option<Value> {
    let id = message.get("id").cloned();
    let method = message.get("method").and_then(|value| value.as_str());

    let Some(method) = method else {
        return Some(jsonrpc_error(
            id.unwrap_or(Value::Null),
            -32600,
            "invalid request: missing method",
        ));
    };

    match method {
        "initialize" => {
            let id = id?;
            Some(jsonrpc_result(id, initialize_result()))
        }
        "initialized" | "notifications/initialized" => None,
        "ping" => id.map(|id| jsonrpc_result(id, json!({}))),
        "tools/list" => {
            let id = id?;
            Some(jsonrpc_result(id, json!({ "tools": tool_definitions() })))
        }
        "tools/call" => {
            let id = id?;
            Some(handle_tool_call(core, id, &message))
        }
        "resources/list" => id.map(|id| jsonrpc_result(id, json!({ "resources": [] }))),
        "prompts/list" => id.map(|id| jsonrpc_result(id, json!({ "prompts": [] }))),
        _ => Some(jsonrpc_error(
            id.unwrap_or(Value::Null),
            -32601,
            &format!("method not found: {method}"),
        )),
    }
}

fn handle_tool_call(core: &mut Core, id: Value, message: &Value) -> Value {
    let Some(params) = message.get("params") else {
        return jsonrpc_error(id, -32602, "missing params for tools/call");
    };
    let tool_name = params
        .get("name")
        .and_then(|value| value.as_str())
        .unwrap_or("");
    if !rpc::tool_names().contains(&tool_name) {
        return jsonrpc_error(id, -32601, &format!("unknown tool: {tool_name}"));
    }
    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    match rpc::handle_method(core, tool_name, arguments) {
        Ok(result) => jsonrpc_result(id, call_result(result)),
        Err(err) if rpc::is_invalid_params(&err) => {
            jsonrpc_error(id, -32602, &err.to_string())
        }
        Err(err) => jsonrpc_error(id, -32603, &format!("{err:#}")),
    }
}

fn call_result(result: Value) -> Value {
    let text = serde_json::to_string(&result).unwrap_or_else(|_| "{}".to_string());
    let text = if text.len() > MAX_RESPONSE_BYTES {
        format!(
            "{{\"error\":\"ResponseTooLarge\",\"bytes\":{},\"hint\":\"reduce maxResults or narrow the query\"}}",
            text.len()
        )
    } else {
        text
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": false,
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": "sharplens",
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn jsonrpc_result(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn jsonrpc_error(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

// ---------------------------------------------------------------------------
// Tool catalog
// ---------------------------------------------------------------------------

fn position_properties() -> Value {
    json!({
        "filePath": { "type": "string", "description": "Absolute path of a document in the loaded solution." },
        "line": { "type": "number", "description": "0-based line." },
        "column": { "type": "number", "description": "0-based column." }
    })
}

fn position_tool(name: &str, description: &str) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": position_properties(),
            "required": ["filePath", "line", "column"]
        }
    })
}

fn listing_tool(name: &str, description: &str) -> Value {
    let mut properties = position_properties();
    if let Value::Object(obj) = &mut properties {
        obj.insert(
            "maxResults".into(),
            json!({ "type": "number", "description": "Maximum results to return." }),
        );
    }
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": ["filePath", "line", "column"]
        }
    })
}

pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "health_check",
            "description": "Report server status, loaded solution, capabilities, and configuration.",
            "inputSchema": { "type": "object", "properties": {} }
        }),
        json!({
            "name": "load_solution",
            "description": "Load a .sln file (replacing any prior solution) and report project/document counts.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "solutionPath": { "type": "string", "description": "Path to a .sln file or a directory containing one." }
                },
                "required": ["solutionPath"]
            }
        }),
        position_tool(
            "get_symbol_info",
            "Resolve the symbol at a position and return its full detail, with resolution debug info.",
        ),
        position_tool(
            "go_to_definition",
            "Resolve the symbol at a position and return its declaration location.",
        ),
        listing_tool(
            "find_references",
            "List references to the symbol at a position across the whole solution.",
        ),
        listing_tool(
            "find_implementations",
            "List types implementing the interface (or deriving from the class) at a position.",
        ),
        listing_tool(
            "find_callers",
            "List members that call the method or property at a position, with call sites.",
        ),
        json!({
            "name": "get_type_hierarchy",
            "description": "Base chain, transitive interfaces, and direct derived types of the type at a position.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" },
                    "line": { "type": "number" },
                    "column": { "type": "number" },
                    "maxDerivedTypes": { "type": "number", "description": "Maximum derived types to return." }
                },
                "required": ["filePath", "line", "column"]
            }
        }),
        json!({
            "name": "search_symbols",
            "description": "Search symbols by name. Queries with * or ? are globs; anything else is a substring match. Paginated.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Glob (e.g. *Handler) or substring." },
                    "kind": { "type": "string", "description": "Symbol kind filter (Class, Interface, Method, ...)." },
                    "namespaceFilter": { "type": "string", "description": "Glob over the containing namespace." },
                    "maxResults": { "type": "number" },
                    "offset": { "type": "number", "description": "Pagination offset." }
                },
                "required": ["query"]
            }
        }),
        json!({
            "name": "semantic_query",
            "description": "Filter symbols by kind, modifiers, accessibility, attributes, parameter and return types.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "kinds": { "type": "array", "items": { "type": "string" } },
                    "isAsync": { "type": "boolean" },
                    "isStatic": { "type": "boolean" },
                    "namespaceFilter": { "type": "string" },
                    "accessibility": { "type": "string" },
                    "type": { "type": "string", "description": "Substring over the member type display." },
                    "returnType": { "type": "string", "description": "Substring over the return type display." },
                    "attributes": { "type": "array", "items": { "type": "string" }, "description": "All listed attributes must be present." },
                    "parameterIncludes": { "type": "array", "items": { "type": "string" } },
                    "parameterExcludes": { "type": "array", "items": { "type": "string" } },
                    "maxResults": { "type": "number" }
                }
            }
        }),
        json!({
            "name": "get_diagnostics",
            "description": "Collect diagnostics at file, project, or solution scope with severity filtering.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string", "description": "File scope." },
                    "projectPath": { "type": "string", "description": "Project scope by exact project file path." },
                    "severity": { "type": "string", "description": "Error, Warning, Info, or Hidden." },
                    "includeHidden": { "type": "boolean", "description": "Include hidden-severity diagnostics (default false)." }
                }
            }
        }),
        json!({
            "name": "get_code_fixes",
            "description": "List code fixes for a diagnostic at a position, or the nearest diagnostics when none match.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" },
                    "diagnosticId": { "type": "string" },
                    "line": { "type": "number" },
                    "column": { "type": "number" }
                },
                "required": ["filePath", "diagnosticId", "line", "column"]
            }
        }),
        json!({
            "name": "apply_code_fix",
            "description": "Apply (or preview) a code fix discovered by get_code_fixes, by index.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" },
                    "diagnosticId": { "type": "string" },
                    "line": { "type": "number" },
                    "column": { "type": "number" },
                    "fixIndex": { "type": "number", "description": "Index from get_code_fixes (default 0)." },
                    "preview": { "type": "boolean", "description": "Default true; false writes files." }
                },
                "required": ["filePath", "diagnosticId", "line", "column"]
            }
        }),
        json!({
            "name": "get_project_structure",
            "description": "Projects of the loaded solution with documents and reference lists.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "includeReferences": { "type": "boolean", "description": "Include project/package references (default true)." },
                    "includeDocuments": { "type": "boolean", "description": "Include per-project document lists (default false)." },
                    "projectNamePattern": { "type": "string", "description": "Glob over project names." },
                    "maxProjects": { "type": "number" },
                    "summaryOnly": { "type": "boolean", "description": "Counts only." }
                }
            }
        }),
        json!({
            "name": "organize_usings",
            "description": "Sort the using directives of one file (System first, then alphabetic) and return the new text.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" }
                },
                "required": ["filePath"]
            }
        }),
        json!({
            "name": "organize_usings_batch",
            "description": "Organize using directives across projects; preview by default.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "projectName": { "type": "string", "description": "Exact project name filter." },
                    "filePattern": { "type": "string", "description": "Glob over bare file names." },
                    "preview": { "type": "boolean", "description": "Default true; false writes files." }
                }
            }
        }),
        json!({
            "name": "format_document_batch",
            "description": "Normalize whitespace across project documents; preview by default.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "projectName": { "type": "string", "description": "Exact project name filter." },
                    "includeTests": { "type": "boolean", "description": "False skips projects whose name contains 'Test'." },
                    "preview": { "type": "boolean", "description": "Default true; false writes files." }
                }
            }
        }),
        position_tool(
            "get_method_overloads",
            "List the same-named ordinary methods on the containing type of the method at a position.",
        ),
        position_tool(
            "get_containing_member",
            "Return the innermost enclosing member declaration at a position, with its full span.",
        ),
        json!({
            "name": "find_unused_code",
            "description": "Flag declarations with no references beyond their own declaration, excluding framework-shaped types.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "projectName": { "type": "string", "description": "Exact project name filter." },
                    "includePrivate": { "type": "boolean", "description": "Consider private symbols (default true)." },
                    "includeInternal": { "type": "boolean", "description": "Consider internal symbols (default true)." },
                    "symbolKindFilter": { "type": "string", "description": "Restrict flagged symbols to one kind." },
                    "maxResults": { "type": "number" }
                }
            }
        }),
        json!({
            "name": "rename_symbol",
            "description": "Rename the symbol at a position across the solution; preview by default.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" },
                    "line": { "type": "number" },
                    "column": { "type": "number" },
                    "newName": { "type": "string" },
                    "preview": { "type": "boolean", "description": "Default true; false writes files." },
                    "maxFiles": { "type": "number", "description": "Cap on edit entries shown in the plan." },
                    "verbosity": { "type": "string", "description": "summary, compact, or full." }
                },
                "required": ["filePath", "line", "column", "newName"]
            }
        }),
        json!({
            "name": "extract_interface",
            "description": "Synthesize an interface from the public instance members of the class or struct at a position.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "filePath": { "type": "string" },
                    "line": { "type": "number" },
                    "column": { "type": "number" },
                    "interfaceName": { "type": "string" },
                    "includeMemberNames": { "type": "array", "items": { "type": "string" }, "description": "Restrict to these member names." }
                },
                "required": ["filePath", "line", "column", "interfaceName"]
            }
        }),
        json!({
            "name": "dependency_graph",
            "description": "Project dependency graph with cycle detection, as JSON or a mermaid diagram.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "format": { "type": "string", "enum": ["json", "mermaid"], "description": "Default json." }
                }
            }
        }),
    ]
}
