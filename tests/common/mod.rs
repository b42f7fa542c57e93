#![allow(dead_code)]

use serde_json::{json, Value};
use sharplens::config::Config;
use sharplens::rpc::{self, Core};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct ProjectSpec<'a> {
    pub name: &'a str,
    /// Names of referenced projects in the same solution.
    pub refs: &'a [&'a str],
    /// (relative file name, source) pairs.
    pub files: &'a [(&'a str, &'a str)],
}

pub struct Fixture {
    pub dir: TempDir,
    pub sln_path: PathBuf,
}

impl Fixture {
    pub fn file(&self, project: &str, name: &str) -> PathBuf {
        self.dir.path().join(project).join(name)
    }

    pub fn file_str(&self, project: &str, name: &str) -> String {
        self.file(project, name).display().to_string()
    }

    pub fn read(&self, project: &str, name: &str) -> String {
        fs::read_to_string(self.file(project, name)).unwrap()
    }
}

pub fn build_solution(projects: &[ProjectSpec]) -> Fixture {
    let dir = TempDir::new().unwrap();
    let mut sln = String::from(
        "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
    );
    for (index, project) in projects.iter().enumerate() {
        let project_dir = dir.path().join(project.name);
        fs::create_dir_all(&project_dir).unwrap();

        let mut refs = String::new();
        for referenced in project.refs {
            refs.push_str(&format!(
                "    <ProjectReference Include=\"..\\{0}\\{0}.csproj\" />\n",
                referenced
            ));
        }
        let csproj = format!(
            "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n{refs}  </ItemGroup>\n</Project>\n"
        );
        fs::write(project_dir.join(format!("{}.csproj", project.name)), csproj).unwrap();

        for (name, source) in project.files {
            let path = project_dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, source).unwrap();
        }

        sln.push_str(&format!(
            "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{0}\", \"{0}\\{0}.csproj\", \"{{11111111-2222-3333-4444-{1:012}}}\"\nEndProject\n",
            project.name, index
        ));
    }
    sln.push_str("Global\nEndGlobal\n");
    let sln_path = dir.path().join("Fixture.sln");
    fs::write(&sln_path, sln).unwrap();
    Fixture { dir, sln_path }
}

pub fn call(core: &mut Core, method: &str, params: Value) -> Value {
    rpc::handle_method(core, method, params).unwrap()
}

pub fn loaded_core(fixture: &Fixture) -> Core {
    loaded_core_with(fixture, Config::default())
}

pub fn loaded_core_with(fixture: &Fixture, config: Config) -> Core {
    let mut core = Core::new(config);
    let summary = call(
        &mut core,
        "load_solution",
        json!({ "solutionPath": fixture.sln_path.display().to_string() }),
    );
    assert_eq!(summary["success"], json!(true), "fixture load failed");
    core
}
