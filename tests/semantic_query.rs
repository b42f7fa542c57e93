mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const SOURCE: &str = r#"using System;

namespace Acme.Api
{
    [Obsolete]
    public class LegacyGateway
    {
    }

    public class OrderApi
    {
        public async System.Threading.Tasks.Task SaveAsync(OrderDto order)
        {
        }

        public System.Threading.Tasks.Task<int> CountAsync()
        {
            return null;
        }

        public void Drop(string id)
        {
        }

        public static int Version()
        {
            return 1;
        }

        private int counter;
    }

    public class OrderDto
    {
    }
}
"#;

fn fixture() -> common::Fixture {
    build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Api.cs", SOURCE)],
    }])
}

fn names(response: &serde_json::Value) -> Vec<String> {
    response["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn async_filter_matches_modifier_exactly() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Method"], "isAsync": true }),
    );
    assert_eq!(names(&response), vec!["SaveAsync"]);
}

#[test]
fn attribute_filter_requires_all_listed() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "semantic_query",
        json!({ "attributes": ["Obsolete"] }),
    );
    assert_eq!(names(&response), vec!["LegacyGateway"]);

    let response = call(
        &mut core,
        "semantic_query",
        json!({ "attributes": ["Obsolete", "Serializable"] }),
    );
    assert!(names(&response).is_empty());
}

#[test]
fn parameter_includes_and_excludes() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let with_dto = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Method"], "parameterIncludes": ["OrderDto"] }),
    );
    assert_eq!(names(&with_dto), vec!["SaveAsync"]);

    let without_string = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Method"], "parameterExcludes": ["string"] }),
    );
    let found = names(&without_string);
    assert!(!found.contains(&"Drop".to_string()));
    assert!(found.contains(&"SaveAsync".to_string()));
}

#[test]
fn return_type_and_static_filters() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let tasks = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Method"], "returnType": "Task" }),
    );
    let mut found = names(&tasks);
    found.sort();
    assert_eq!(found, vec!["CountAsync", "SaveAsync"]);

    let statics = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Method"], "isStatic": true }),
    );
    assert_eq!(names(&statics), vec!["Version"]);
}

#[test]
fn accessibility_and_kind_counts() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "semantic_query",
        json!({ "kinds": ["Field"], "accessibility": "private" }),
    );
    assert_eq!(names(&response), vec!["counter"]);
    assert_eq!(response["byKind"]["Field"], json!(1));
    assert_eq!(response["truncated"], json!(false));
}

#[test]
fn unknown_accessibility_is_invalid_params() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let err = sharplens::rpc::handle_method(
        &mut core,
        "semantic_query",
        json!({ "accessibility": "cosmic" }),
    )
    .unwrap_err();
    assert!(sharplens::rpc::is_invalid_params(&err));
}
