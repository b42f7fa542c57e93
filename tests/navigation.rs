mod common;

use common::{build_solution, call, loaded_core, ProjectSpec};
use serde_json::json;

const SHAPES: &str = r#"namespace Geo
{
    public interface IShape
    {
        double Area();
    }

    public class Circle : IShape
    {
        public double Area()
        {
            return 0.0;
        }
    }

    public class Square : IShape
    {
        public double Area()
        {
            return 0.0;
        }
    }

    public class Base
    {
    }

    public class Mid : Base
    {
    }

    public class Leaf : Mid, IShape
    {
        public double Area()
        {
            return 0.0;
        }
    }
}
"#;

const CALLS: &str = r#"namespace Geo
{
    public class Runner
    {
        public void Helper()
        {
        }

        public void Greet()
        {
            Helper();
        }

        public int Compute(int value)
        {
            return value;
        }

        public int Compute(int value, int other)
        {
            return value + other;
        }
    }
}
"#;

fn fixture() -> common::Fixture {
    build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Shapes.cs", SHAPES), ("Calls.cs", CALLS)],
    }])
}

// `public interface IShape` sits on line 2, identifier at column 21.
#[test]
fn implementations_of_an_interface() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "find_implementations",
        json!({
            "filePath": fixture.file_str("App", "Shapes.cs"),
            "line": 2,
            "column": 21,
        }),
    );
    assert_eq!(response["symbolName"], json!("IShape"));
    let mut names: Vec<&str> = response["implementations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Circle", "Leaf", "Square"]);
    assert_eq!(response["totalImplementations"], json!(3));
    assert_eq!(response["truncated"], json!(false));
}

#[test]
fn implementations_rejects_non_type_symbols() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // Position of the Area method inside Circle (line 9, column 22).
    let response = call(
        &mut core,
        "find_implementations",
        json!({
            "filePath": fixture.file_str("App", "Shapes.cs"),
            "line": 9,
            "column": 22,
        }),
    );
    assert_eq!(response["error"], json!("WrongSymbolKind"));
    assert!(response["hint"].as_str().unwrap().contains("interface"));
}

#[test]
fn type_hierarchy_walks_bases_and_derived() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // `public class Mid : Base` is on line 27, identifier at column 17.
    let response = call(
        &mut core,
        "get_type_hierarchy",
        json!({
            "filePath": fixture.file_str("App", "Shapes.cs"),
            "line": 27,
            "column": 17,
        }),
    );
    assert_eq!(response["typeName"], json!("Geo.Mid"));
    assert_eq!(response["baseTypes"], json!(["Geo.Base"]));
    let derived = response["derivedTypes"].as_array().unwrap();
    assert_eq!(derived.len(), 1);
    assert_eq!(derived[0]["name"], json!("Leaf"));
    assert_eq!(response["totalDerivedTypes"], json!(1));
}

#[test]
fn leaf_hierarchy_includes_transitive_interfaces() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // `public class Leaf : Mid, IShape` on line 31, identifier at column 17.
    let response = call(
        &mut core,
        "get_type_hierarchy",
        json!({
            "filePath": fixture.file_str("App", "Shapes.cs"),
            "line": 31,
            "column": 17,
        }),
    );
    assert_eq!(response["baseTypes"], json!(["Geo.Mid", "Geo.Base"]));
    assert_eq!(response["interfaces"], json!(["Geo.IShape"]));
}

#[test]
fn callers_group_call_sites_by_enclosing_member() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // `public void Helper()` on line 4 of Calls.cs, identifier at column 20.
    let response = call(
        &mut core,
        "find_callers",
        json!({
            "filePath": fixture.file_str("App", "Calls.cs"),
            "line": 4,
            "column": 20,
        }),
    );
    assert_eq!(response["symbolName"], json!("Helper"));
    assert_eq!(response["totalCallers"], json!(1));
    let caller = &response["callers"][0];
    assert_eq!(caller["caller"]["name"], json!("Greet"));
    assert_eq!(caller["callSites"].as_array().unwrap().len(), 1);
}

#[test]
fn callers_rejects_types() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "find_callers",
        json!({
            "filePath": fixture.file_str("App", "Shapes.cs"),
            "line": 2,
            "column": 21,
        }),
    );
    assert_eq!(response["error"], json!("WrongSymbolKind"));
}

#[test]
fn method_overloads_on_the_containing_type() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // First Compute overload on line 13, identifier at column 19.
    let response = call(
        &mut core,
        "get_method_overloads",
        json!({
            "filePath": fixture.file_str("App", "Calls.cs"),
            "line": 13,
            "column": 19,
        }),
    );
    assert_eq!(response["methodName"], json!("Compute"));
    assert_eq!(response["totalOverloads"], json!(2));
    let overloads = response["overloads"].as_array().unwrap();
    assert!(overloads.iter().all(|o| o["name"] == json!("Compute")));
}

#[test]
fn containing_member_finds_the_enclosing_method() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // Inside Greet's body: the Helper() call on line 10.
    let response = call(
        &mut core,
        "get_containing_member",
        json!({
            "filePath": fixture.file_str("App", "Calls.cs"),
            "line": 10,
            "column": 13,
        }),
    );
    assert_eq!(response["name"], json!("Greet"));
    assert_eq!(response["kind"], json!("Method"));
    let span = &response["span"];
    assert!(span["startLine"].as_u64().unwrap() <= 9);
    assert!(span["endLine"].as_u64().unwrap() >= 11);
}

#[test]
fn go_to_definition_from_a_use_site() {
    let fixture = fixture();
    let mut core = loaded_core(&fixture);
    // The Helper() call inside Greet (line 10, column 12).
    let response = call(
        &mut core,
        "go_to_definition",
        json!({
            "filePath": fixture.file_str("App", "Calls.cs"),
            "line": 10,
            "column": 12,
        }),
    );
    assert_eq!(response["symbolName"], json!("Helper"));
    let location = &response["location"];
    assert_eq!(location["startLine"], json!(4));

    // An unresolvable name reports external metadata.
    let external_src = "namespace Geo;\n\npublic class Uses\n{\n    public void M()\n    {\n        Console.WriteLine(1);\n    }\n}\n";
    let fixture = build_solution(&[ProjectSpec {
        name: "App",
        refs: &[],
        files: &[("Uses.cs", external_src)],
    }]);
    let mut core = loaded_core(&fixture);
    let response = call(
        &mut core,
        "go_to_definition",
        json!({
            "filePath": fixture.file_str("App", "Uses.cs"),
            "line": 6,
            "column": 10,
        }),
    );
    assert_eq!(response["error"], json!("SymbolInMetadata"));
    assert_eq!(response["symbolName"], json!("Console"));
}
