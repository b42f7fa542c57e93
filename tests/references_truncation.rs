mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

/// A type referenced 150 times in total: the declaration plus 149 field
/// declarations naming it.
fn widget_source() -> String {
    let mut source = String::from("namespace Demo;\n\npublic class Widget\n{\n}\n\npublic class Holder\n{\n");
    for index in 0..149 {
        source.push_str(&format!("    public Widget F{index};\n"));
    }
    source.push_str("}\n");
    source
}

#[test]
fn truncation_contract_reports_full_total_and_hint() {
    let source = widget_source();
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Widget.cs", &source)],
    }]);
    let mut core = loaded_core(&fixture);

    let response = call(
        &mut core,
        "find_references",
        json!({
            "filePath": fixture.file_str("App", "Widget.cs"),
            "line": 2,
            "column": 13,
            "maxResults": 50,
        }),
    );
    assert_eq!(response["symbolName"], json!("Widget"));
    assert_eq!(response["totalReferences"], json!(150));
    assert_eq!(response["referencesShown"], json!(50));
    assert_eq!(response["truncated"], json!(true));
    assert_eq!(response["references"].as_array().unwrap().len(), 50);
    let hint = response["hint"].as_str().unwrap();
    assert!(hint.contains("maxResults"));
}

#[test]
fn untruncated_listing_has_no_hint() {
    let source = "namespace Demo;\n\npublic class Widget\n{\n}\n\npublic class Holder\n{\n    public Widget Only;\n}\n";
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Widget.cs", source)],
    }]);
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "find_references",
        json!({
            "filePath": fixture.file_str("App", "Widget.cs"),
            "line": 2,
            "column": 13,
        }),
    );
    assert_eq!(response["totalReferences"], json!(2));
    assert_eq!(response["truncated"], json!(false));
    assert!(response["hint"].is_null());
    let first = &response["references"][0];
    assert_eq!(first["kind"], json!("read"));
    assert!(first["excerpt"].as_str().unwrap().contains("Widget"));
}
