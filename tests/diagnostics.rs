mod common;

use common::{build_solution, call, loaded_core, loaded_core_with, ProjectSpec};
use serde_json::json;
use sharplens::config::Config;

const MODELS: &str = "namespace Acme.Models;\n\npublic class User\n{\n}\n";
const UNUSED_USING: &str =
    "using Acme.Models;\n\nnamespace Acme.App;\n\npublic class Service\n{\n}\n";
const USED_USING: &str = "using Acme.Models;\n\nnamespace Acme.App;\n\npublic class Consumer\n{\n    public User Current;\n}\n";
const BROKEN: &str = "namespace Acme.App;\n\npublic class Broken\n{\n    public void M( {\n}\n";

#[test]
fn unused_using_is_flagged_and_used_using_is_not() {
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[
            ("Models.cs", MODELS),
            ("Service.cs", UNUSED_USING),
            ("Consumer.cs", USED_USING),
        ],
    }]);
    let mut core = loaded_core(&fixture);

    let response = call(
        &mut core,
        "get_diagnostics",
        json!({ "filePath": fixture.file_str("App", "Service.cs") }),
    );
    assert_eq!(response["scope"], json!("file"));
    let diags = response["diagnostics"].as_array().unwrap();
    assert!(diags.iter().any(|d| d["id"] == json!("USG001")));

    let clean = call(
        &mut core,
        "get_diagnostics",
        json!({ "filePath": fixture.file_str("App", "Consumer.cs") }),
    );
    let diags = clean["diagnostics"].as_array().unwrap();
    assert!(!diags.iter().any(|d| d["id"] == json!("USG001")));
}

#[test]
fn syntax_errors_surface_with_error_severity() {
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Broken.cs", BROKEN)],
    }]);
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "get_diagnostics",
        json!({ "filePath": fixture.file_str("App", "Broken.cs") }),
    );
    let diags = response["diagnostics"].as_array().unwrap();
    assert!(!diags.is_empty());
    assert!(diags.iter().all(|d| d["severity"] == json!("Error")));
    assert!(response["summary"]["errors"].as_u64().unwrap() >= 1);
}

#[test]
fn severity_filter_and_hidden_exclusion() {
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[
            ("Models.cs", MODELS),
            // Unsorted usings produce a Hidden diagnostic.
            ("Messy.cs", "using Zebra;\nusing Acme.Models;\n\nnamespace Acme.App;\n\npublic class Messy\n{\n    public User U;\n}\n"),
        ],
    }]);
    let mut core = loaded_core(&fixture);

    let default = call(&mut core, "get_diagnostics", json!({}));
    let diags = default["diagnostics"].as_array().unwrap();
    assert!(!diags.iter().any(|d| d["severity"] == json!("Hidden")));

    let hidden = call(
        &mut core,
        "get_diagnostics",
        json!({ "includeHidden": true }),
    );
    let diags = hidden["diagnostics"].as_array().unwrap();
    assert!(diags.iter().any(|d| d["id"] == json!("USG002")));

    let warnings_only = call(
        &mut core,
        "get_diagnostics",
        json!({ "severity": "warning", "includeHidden": true }),
    );
    for d in warnings_only["diagnostics"].as_array().unwrap() {
        assert_eq!(d["severity"], json!("Warning"));
    }
}

#[test]
fn summary_counts_come_from_the_truncated_list() {
    let files: Vec<(String, String)> = (0..5)
        .map(|i| (format!("F{i}.cs"), UNUSED_USING.replace("Service", &format!("S{i}"))))
        .collect();
    let mut file_refs: Vec<(&str, &str)> = vec![("Models.cs", MODELS)];
    for (name, source) in &files {
        file_refs.push((name.as_str(), source.as_str()));
    }
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &file_refs,
    }]);
    let config = Config {
        max_diagnostics: 2,
        ..Config::default()
    };
    let mut core = loaded_core_with(&fixture, config);

    let response = call(&mut core, "get_diagnostics", json!({ "severity": "warning" }));
    assert_eq!(response["total"], json!(5));
    assert_eq!(response["shown"], json!(2));
    assert_eq!(response["truncated"], json!(true));
    // Post-truncation counting is observable and contractual.
    assert_eq!(response["summary"]["warnings"], json!(2));
}

#[test]
fn project_scope_requires_exact_path() {
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Models.cs", MODELS)],
    }]);
    let mut core = loaded_core(&fixture);

    let project_path = fixture.dir.path().join("App").join("App.csproj");
    let response = call(
        &mut core,
        "get_diagnostics",
        json!({ "projectPath": project_path.display().to_string() }),
    );
    assert_eq!(response["scope"], json!("project"));

    let missing = call(
        &mut core,
        "get_diagnostics",
        json!({ "projectPath": "/nope/Nope.csproj" }),
    );
    assert_eq!(missing["error"], json!("ProjectNotFound"));
}
