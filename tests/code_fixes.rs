mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const MODELS: &str = "namespace Acme.Models;\n\npublic class User\n{\n}\n";
const SERVICE: &str =
    "using Acme.Models;\n\nnamespace Acme.App;\n\npublic class Service\n{\n}\n";

fn fixture() -> common::Fixture {
    build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Models.cs", MODELS), ("Service.cs", SERVICE)],
    }])
}

#[test]
fn discovery_matches_by_position_then_distance_then_file() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let file = fixture.file_str("App", "Service.cs");

    // Exactly on the using directive.
    let on_span = call(
        &mut core,
        "get_code_fixes",
        json!({ "filePath": file, "diagnosticId": "USG001", "line": 0, "column": 0 }),
    );
    assert_eq!(on_span["matchedBy"], json!("position"));
    assert_eq!(on_span["diagnostic"]["id"], json!("USG001"));
    assert!(on_span["totalFixes"].as_u64().unwrap() >= 1);

    // A few characters past the directive: distance strategy.
    let near = call(
        &mut core,
        "get_code_fixes",
        json!({ "filePath": file, "diagnosticId": "USG001", "line": 1, "column": 0 }),
    );
    assert!(matches!(
        near["matchedBy"].as_str().unwrap(),
        "position" | "distance"
    ));

    // Far away in the file: anywhere-in-file strategy.
    let far = call(
        &mut core,
        "get_code_fixes",
        json!({ "filePath": file, "diagnosticId": "USG001", "line": 5, "column": 0 }),
    );
    assert_eq!(far["matchedBy"], json!("file"));
}

#[test]
fn unknown_diagnostic_lists_nearest_candidates() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "get_code_fixes",
        json!({
            "filePath": fixture.file_str("App", "Service.cs"),
            "diagnosticId": "CS9999",
            "line": 0,
            "column": 0,
        }),
    );
    assert_eq!(response["error"], json!("DiagnosticNotFound"));
    let nearest = response["nearestDiagnostics"].as_array().unwrap();
    assert!(nearest.len() <= 10);
    assert!(nearest.iter().any(|d| d["id"] == json!("USG001")));
}

#[test]
fn apply_preview_then_write_removes_the_using() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let file = fixture.file_str("App", "Service.cs");

    let preview = call(
        &mut core,
        "apply_code_fix",
        json!({ "filePath": file, "diagnosticId": "USG001", "line": 0, "column": 0 }),
    );
    assert_eq!(preview["preview"], json!(true));
    assert_eq!(preview["totalFiles"], json!(1));
    assert_eq!(fixture.read("App", "Service.cs"), SERVICE);

    let applied = call(
        &mut core,
        "apply_code_fix",
        json!({
            "filePath": file,
            "diagnosticId": "USG001",
            "line": 0,
            "column": 0,
            "preview": false,
        }),
    );
    assert_eq!(applied["applied"], json!(true));
    assert_eq!(applied["success"], json!(true));

    let on_disk = fixture.read("App", "Service.cs");
    assert!(!on_disk.contains("using Acme.Models;"));

    // The diagnostic is gone after the workspace republish.
    let diagnostics = call(
        &mut core,
        "get_diagnostics",
        json!({ "filePath": file }),
    );
    let diags = diagnostics["diagnostics"].as_array().unwrap();
    assert!(!diags.iter().any(|d| d["id"] == json!("USG001")));
}

#[test]
fn fix_index_out_of_range_is_structured() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "apply_code_fix",
        json!({
            "filePath": fixture.file_str("App", "Service.cs"),
            "diagnosticId": "USG001",
            "line": 0,
            "column": 0,
            "fixIndex": 9,
        }),
    );
    assert_eq!(response["error"], json!("FixIndexOutOfRange"));
    assert!(response["totalFixes"].as_u64().unwrap() >= 1);
}

#[test]
fn organize_fix_provider_handles_unsorted_usings() {
    let messy = "using Zebra.Core;\nusing System;\n\nnamespace Acme.App;\n\npublic class M\n{\n}\n";
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("M.cs", messy)],
    }]);
    let mut core = loaded_core(&fixture);
    let file = fixture.file_str("App", "M.cs");

    let fixes = call(
        &mut core,
        "get_code_fixes",
        json!({ "filePath": file, "diagnosticId": "USG002", "line": 0, "column": 0 }),
    );
    assert_eq!(fixes["diagnostic"]["id"], json!("USG002"));
    assert_eq!(fixes["fixes"][0]["provider"], json!("organize_usings"));

    let applied = call(
        &mut core,
        "apply_code_fix",
        json!({
            "filePath": file,
            "diagnosticId": "USG002",
            "line": 0,
            "column": 0,
            "preview": false,
        }),
    );
    assert_eq!(applied["applied"], json!(true));
    let on_disk = fixture.read("App", "M.cs");
    assert!(on_disk.starts_with("using System;\nusing Zebra.Core;\n"));
}
