mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const FILE_A: &str = "namespace Demo;\n\npublic class Foo\n{\n    public void Bar()\n    {\n    }\n}\n";
const FILE_B: &str = "namespace Demo;\n\npublic class Caller\n{\n    public void Run()\n    {\n        new Foo().Bar();\n    }\n}\n";

fn fixture() -> common::Fixture {
    build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Foo.cs", FILE_A), ("Caller.cs", FILE_B)],
    }])
}

#[test]
fn preview_plans_both_files_without_writing() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "rename_symbol",
        json!({
            "filePath": fixture.file_str("App", "Foo.cs"),
            "line": 2,
            "column": 13,
            "newName": "Baz",
            "preview": true,
        }),
    );
    assert_eq!(response["preview"], json!(true));
    assert_eq!(response["symbolName"], json!("Foo"));
    assert_eq!(response["totalFiles"], json!(2));
    assert!(response["totalChanges"].as_u64().unwrap() >= 2);

    // Preview must not touch the filesystem.
    assert_eq!(fixture.read("App", "Foo.cs"), FILE_A);
    assert_eq!(fixture.read("App", "Caller.cs"), FILE_B);
}

#[test]
fn apply_rewrites_both_files_and_references_survive() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);

    // Preview first, capturing the planned post-texts at full verbosity.
    let preview = call(
        &mut core,
        "rename_symbol",
        json!({
            "filePath": fixture.file_str("App", "Foo.cs"),
            "line": 2,
            "column": 13,
            "newName": "Baz",
            "preview": true,
            "verbosity": "full",
        }),
    );
    let planned: Vec<(String, String)> = preview["edits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|edit| {
            (
                edit["filePath"].as_str().unwrap().to_string(),
                edit["newText"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(planned.len(), 2);

    let applied = call(
        &mut core,
        "rename_symbol",
        json!({
            "filePath": fixture.file_str("App", "Foo.cs"),
            "line": 2,
            "column": 13,
            "newName": "Baz",
            "preview": false,
        }),
    );
    assert_eq!(applied["applied"], json!(true));
    assert_eq!(applied["success"], json!(true));

    let foo_text = fixture.read("App", "Foo.cs");
    let caller_text = fixture.read("App", "Caller.cs");
    assert!(foo_text.contains("class Baz"));
    assert!(!foo_text.contains("class Foo"));
    assert!(caller_text.contains("new Baz()"));
    assert!(!caller_text.contains("new Foo()"));

    // The preview's planned texts and the applied texts agree.
    for (path, text) in planned {
        let on_disk = std::fs::read_to_string(&path).unwrap();
        assert_eq!(on_disk, text, "preview/apply divergence for {path}");
    }

    // The workspace was republished: references to the new name resolve.
    let references = call(
        &mut core,
        "find_references",
        json!({
            "filePath": fixture.file_str("App", "Foo.cs"),
            "line": 2,
            "column": 13,
        }),
    );
    assert!(references["totalReferences"].as_u64().unwrap() >= 1);
    assert_eq!(references["symbolName"], json!("Baz"));
}

#[test]
fn rename_rejects_invalid_and_external_targets() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);

    let response = call(
        &mut core,
        "rename_symbol",
        json!({
            "filePath": fixture.file_str("App", "Foo.cs"),
            "line": 2,
            "column": 13,
            "newName": "not an identifier",
        }),
    );
    assert_eq!(response["error"], json!("InvalidName"));

    // `Demo` alone resolves; an unknown external name is rejected.
    let source = "namespace Demo;\n\npublic class Uses\n{\n    public void M()\n    {\n        System.Console.WriteLine(1);\n    }\n}\n";
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Uses.cs", source)],
    }]);
    let mut core = loaded_core(&fixture);
    // Position on `Console` (line 6, "        System.Console..." column 15).
    let response = call(
        &mut core,
        "rename_symbol",
        json!({
            "filePath": fixture.file_str("App", "Uses.cs"),
            "line": 6,
            "column": 16,
            "newName": "Terminal",
        }),
    );
    assert_eq!(response["error"], json!("SymbolInMetadata"));
}
