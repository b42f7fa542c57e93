mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const MESSY: &str = "using Zebra.Core;\nusing System.Text;\nusing Acme;\nusing System;\n\nnamespace App;\n\npublic class C\n{\n}\n";
const SORTED: &str = "using System;\nusing System.Text;\nusing Acme;\nusing Zebra.Core;\n\nnamespace App;\n\npublic class C\n{\n}\n";

fn fixture() -> common::Fixture {
    build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("C.cs", MESSY)],
    }])
}

#[test]
fn single_file_sorts_system_first() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "organize_usings",
        json!({ "filePath": fixture.file_str("App", "C.cs") }),
    );
    assert_eq!(response["changed"], json!(true));
    assert_eq!(response["newText"], json!(SORTED));
    // The single-file operation never writes.
    assert_eq!(fixture.read("App", "C.cs"), MESSY);
}

#[test]
fn batch_preview_then_apply_reaches_a_fixed_point() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);

    let preview = call(&mut core, "organize_usings_batch", json!({}));
    assert_eq!(preview["preview"], json!(true));
    assert_eq!(preview["totalFiles"], json!(1));
    assert_eq!(fixture.read("App", "C.cs"), MESSY);

    let applied = call(
        &mut core,
        "organize_usings_batch",
        json!({ "preview": false }),
    );
    assert_eq!(applied["applied"], json!(true));
    assert_eq!(fixture.read("App", "C.cs"), SORTED);

    // Organizing an organized solution plans nothing: idempotence.
    let again = call(&mut core, "organize_usings_batch", json!({}));
    assert_eq!(again["totalFiles"], json!(0));
    let single = call(
        &mut core,
        "organize_usings",
        json!({ "filePath": fixture.file_str("App", "C.cs") }),
    );
    assert_eq!(single["changed"], json!(false));
    assert_eq!(single["newText"], json!(SORTED));
}

#[test]
fn batch_respects_project_and_file_filters() {
    let fixture = build_solution(&[
        ProjectSpec {
            name: "App",
            refs: &[],
            files: &[("C.cs", MESSY)],
        },
        ProjectSpec {
            name: "Lib",
            refs: &[],
            files: &[("D.cs", MESSY)],
        },
    ]);
    let mut core = loaded_core(&fixture);

    let scoped = call(
        &mut core,
        "organize_usings_batch",
        json!({ "projectName": "Lib" }),
    );
    assert_eq!(scoped["totalFiles"], json!(1));

    let pattern = call(
        &mut core,
        "organize_usings_batch",
        json!({ "filePattern": "C.*" }),
    );
    assert_eq!(pattern["totalFiles"], json!(1));

    let missing = call(
        &mut core,
        "organize_usings_batch",
        json!({ "projectName": "Nope" }),
    );
    assert_eq!(missing["error"], json!("ProjectNotFound"));
}
