mod common;

use common::{build_solution, call, loaded_core, loaded_core_with, ProjectSpec};
use serde_json::json;
use sharplens::config::Config;
use sharplens::rpc::Core;

const CORE_SRC: &str = "namespace Corp.Core;\n\npublic class Engine\n{\n}\n";
const APP_SRC: &str = "namespace Corp.App;\n\npublic class Program\n{\n}\n";

fn fixture() -> common::Fixture {
    build_solution(&[
        ProjectSpec {
            name: "Corp.Core",
            refs: &[],
            files: &[("Engine.cs", CORE_SRC)],
        },
        ProjectSpec {
            name: "Corp.App",
            refs: &["Corp.Core"],
            files: &[("Program.cs", APP_SRC)],
        },
    ])
}

#[test]
fn health_is_not_ready_before_load_and_ready_after() {
    let mut core = Core::new(Config::default());
    let before = call(&mut core, "health_check", json!({}));
    assert_eq!(before["status"], json!("Not Ready"));
    assert!(before["message"].as_str().unwrap().contains("load_solution"));
    assert!(before["capabilities"]["tools"].as_u64().unwrap() >= 20);

    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let after = call(&mut core, "health_check", json!({}));
    assert_eq!(after["status"], json!("Ready"));
    assert_eq!(after["solution"]["projectCount"], json!(2));
    assert_eq!(after["solution"]["documentCount"], json!(2));
    assert!(after["solution"]["symbolCount"].as_u64().unwrap() >= 4);
    assert_eq!(after["configuration"]["maxDiagnostics"], json!(100));
}

#[test]
fn empty_solution_is_ready_with_zero_projects() {
    let fixture = build_solution(&[]);
    let mut core = loaded_core(&fixture);
    let health = call(&mut core, "health_check", json!({}));
    assert_eq!(health["status"], json!("Ready"));
    let structure = call(&mut core, "get_project_structure", json!({}));
    assert_eq!(structure["projectCount"], json!(0));
    assert_eq!(structure["projects"], json!([]));
}

#[test]
fn load_solution_reports_counts_and_reload_replaces_state() {
    let fixture = fixture();
    let mut core = Core::new(Config::default());
    let summary = call(
        &mut core,
        "load_solution",
        json!({ "solutionPath": fixture.sln_path.display().to_string() }),
    );
    assert_eq!(summary["projectCount"], json!(2));
    assert_eq!(summary["documentCount"], json!(2));

    // Reload tears down prior state and caches.
    let summary = call(
        &mut core,
        "load_solution",
        json!({ "solutionPath": fixture.sln_path.display().to_string() }),
    );
    assert_eq!(summary["success"], json!(true));
    let health = call(&mut core, "health_check", json!({}));
    assert_eq!(health["workspace"]["cachedDocuments"], json!(0));
}

#[test]
fn project_structure_references_and_documents() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "get_project_structure",
        json!({ "includeDocuments": true }),
    );
    let projects = response["projects"].as_array().unwrap();
    assert_eq!(projects.len(), 2);
    let app = projects
        .iter()
        .find(|p| p["name"] == json!("Corp.App"))
        .unwrap();
    assert_eq!(app["projectReferences"], json!(["Corp.Core"]));
    assert_eq!(app["language"], json!("C#"));
    let docs = app["documents"].as_array().unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["name"], json!("Program.cs"));
}

#[test]
fn project_structure_pattern_and_summary() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let filtered = call(
        &mut core,
        "get_project_structure",
        json!({ "projectNamePattern": "*.Core" }),
    );
    assert_eq!(filtered["projectCount"], json!(1));
    assert_eq!(filtered["projects"][0]["name"], json!("Corp.Core"));

    let summary = call(
        &mut core,
        "get_project_structure",
        json!({ "summaryOnly": true }),
    );
    assert_eq!(summary["projectCount"], json!(2));
    assert_eq!(summary["documentCount"], json!(2));
    assert!(summary.get("projects").is_none());
}

#[test]
fn document_cache_can_be_disabled() {
    let fixture = fixture();
    let config = Config {
        semantic_cache_enabled: false,
        ..Config::default()
    };
    let mut core = loaded_core_with(&fixture, config);
    // Lookups still succeed with the cache off.
    let response = call(
        &mut core,
        "get_symbol_info",
        json!({
            "filePath": fixture.file_str("Corp.Core", "Engine.cs"),
            "line": 2,
            "column": 13,
        }),
    );
    assert_eq!(response["name"], json!("Engine"));
    let health = call(&mut core, "health_check", json!({}));
    assert_eq!(health["workspace"]["cacheEnabled"], json!(false));
    assert_eq!(health["workspace"]["cachedDocuments"], json!(0));
}

#[test]
fn repeated_lookups_hit_the_cache() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    for _ in 0..2 {
        call(
            &mut core,
            "get_symbol_info",
            json!({
                "filePath": fixture.file_str("Corp.Core", "Engine.cs"),
                "line": 2,
                "column": 13,
            }),
        );
    }
    let health = call(&mut core, "health_check", json!({}));
    assert_eq!(health["workspace"]["cachedDocuments"], json!(1));
}
