// Project-file parsing and source discovery. SDK-style projects pick up
// every .cs file below the project directory (bin/ and obj/ excluded);
// old-style projects list their sources as <Compile Include="..."/> items.

use anyhow::Result;
use ignore::WalkBuilder;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct PackageRef {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// ProjectReference paths, relative to the project directory.
    pub project_refs: Vec<PathBuf>,
    pub package_refs: Vec<PackageRef>,
    /// Explicit <Compile> items; empty for SDK-style projects.
    pub compile_items: Vec<PathBuf>,
    pub sdk_style: bool,
}

fn attr_re(element: &str, attr: &str) -> Regex {
    Regex::new(&format!(
        r#"(?s)<{element}\b[^>]*\b{attr}\s*=\s*"([^"]+)""#
    ))
    .expect("project attribute regex")
}

fn project_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attr_re("ProjectReference", "Include"))
}

fn compile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attr_re("Compile", "Include"))
}

fn package_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<PackageReference\b[^>]*\bInclude\s*=\s*"([^"]+)"(?:[^>]*\bVersion\s*=\s*"([^"]+)")?"#)
            .expect("package reference regex")
    })
}

fn sdk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| attr_re("Project", "Sdk"))
}

pub fn parse(source: &str) -> ProjectFile {
    let project_refs = project_ref_re()
        .captures_iter(source)
        .map(|caps| PathBuf::from(caps[1].replace('\\', "/")))
        .collect();
    let package_refs = package_ref_re()
        .captures_iter(source)
        .map(|caps| PackageRef {
            name: caps[1].to_string(),
            version: caps.get(2).map(|m| m.as_str().to_string()),
        })
        .collect();
    let compile_items: Vec<PathBuf> = compile_re()
        .captures_iter(source)
        .map(|caps| PathBuf::from(caps[1].replace('\\', "/")))
        .filter(|p| !p.to_string_lossy().contains('*'))
        .collect();
    ProjectFile {
        project_refs,
        package_refs,
        compile_items,
        sdk_style: sdk_re().is_match(source),
    }
}

/// Source files for a project: explicit Compile items when present,
/// otherwise a walk of the project directory. Results are sorted for
/// deterministic document ordering.
pub fn source_files(project_dir: &Path, parsed: &ProjectFile) -> Result<Vec<PathBuf>> {
    if !parsed.compile_items.is_empty() {
        let mut files: Vec<PathBuf> = parsed
            .compile_items
            .iter()
            .map(|rel| project_dir.join(rel))
            .filter(|p| p.is_file())
            .collect();
        files.sort();
        return Ok(files);
    }

    let mut files = Vec::new();
    let walker = WalkBuilder::new(project_dir)
        .hidden(false)
        .git_global(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
                && (name.eq_ignore_ascii_case("bin") || name.eq_ignore_ascii_case("obj")))
        })
        .build();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        let path = entry.path();
        if path.extension().map(|ext| ext == "cs").unwrap_or(false) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SDK_PROJECT: &str = r#"
<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Core\Core.csproj" />
    <PackageReference Include="Newtonsoft.Json" Version="13.0.3" />
    <PackageReference Include="Serilog" />
  </ItemGroup>
</Project>
"#;

    #[test]
    fn parses_sdk_project() {
        let parsed = parse(SDK_PROJECT);
        assert!(parsed.sdk_style);
        assert_eq!(parsed.project_refs, vec![PathBuf::from("../Core/Core.csproj")]);
        assert_eq!(parsed.package_refs.len(), 2);
        assert_eq!(parsed.package_refs[0].name, "Newtonsoft.Json");
        assert_eq!(parsed.package_refs[0].version.as_deref(), Some("13.0.3"));
        assert_eq!(parsed.package_refs[1].version, None);
        assert!(parsed.compile_items.is_empty());
    }

    #[test]
    fn parses_explicit_compile_items() {
        let source = r#"
<Project ToolsVersion="15.0">
  <ItemGroup>
    <Compile Include="Program.cs" />
    <Compile Include="Models\User.cs" />
    <Compile Include="**\*.generated.cs" />
  </ItemGroup>
</Project>
"#;
        let parsed = parse(source);
        assert!(!parsed.sdk_style);
        assert_eq!(
            parsed.compile_items,
            vec![PathBuf::from("Program.cs"), PathBuf::from("Models/User.cs")]
        );
    }
}
