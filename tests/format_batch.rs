mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const RAGGED: &str = "namespace App;\n\npublic class C\n{\n\tpublic void M()   \n\t{\n\t}\n\n\n\n}\n";
const CLEAN: &str = "namespace App;\n\npublic class C\n{\n    public void M()\n    {\n    }\n\n}\n";

#[test]
fn preview_plans_and_apply_normalizes_whitespace() {
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("C.cs", RAGGED)],
    }]);
    let mut core = loaded_core(&fixture);

    let preview = call(&mut core, "format_document_batch", json!({}));
    assert_eq!(preview["preview"], json!(true));
    assert_eq!(preview["totalFiles"], json!(1));
    assert_eq!(fixture.read("App", "C.cs"), RAGGED);

    let applied = call(
        &mut core,
        "format_document_batch",
        json!({ "preview": false }),
    );
    assert_eq!(applied["applied"], json!(true));
    assert_eq!(fixture.read("App", "C.cs"), CLEAN);

    // Formatting a formatted solution plans nothing.
    let again = call(&mut core, "format_document_batch", json!({}));
    assert_eq!(again["totalFiles"], json!(0));
}

#[test]
fn include_tests_false_skips_test_projects() {
    let fixture = build_solution(&[
        ProjectSpec {
            name: "App",
            refs: &[],
            files: &[("C.cs", RAGGED)],
        },
        ProjectSpec {
            name: "App.Tests",
            refs: &[],
            files: &[("T.cs", RAGGED)],
        },
    ]);
    let mut core = loaded_core(&fixture);

    let without_tests = call(
        &mut core,
        "format_document_batch",
        json!({ "includeTests": false }),
    );
    assert_eq!(without_tests["totalFiles"], json!(1));

    let with_tests = call(&mut core, "format_document_batch", json!({}));
    assert_eq!(with_tests["totalFiles"], json!(2));
}
