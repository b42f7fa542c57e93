// Visual Studio solution file parsing. Only the Project entries matter;
// configuration sections are skipped.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct SolutionEntry {
    pub name: String,
    /// Project file path relative to the solution directory, separators
    /// normalized to the platform.
    pub rel_path: PathBuf,
    pub guid: String,
}

fn project_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?m)^Project\("\{[0-9A-Fa-f-]+\}"\)\s*=\s*"([^"]+)",\s*"([^"]+)",\s*"\{([0-9A-Fa-f-]+)\}""#,
        )
        .expect("solution project regex")
    })
}

/// Parse the textual .sln format, keeping only C# project entries
/// (`*.csproj`). Solution folders carry a folder name instead of a project
/// path and are dropped here.
pub fn parse(source: &str) -> Vec<SolutionEntry> {
    let mut entries = Vec::new();
    for caps in project_line_re().captures_iter(source) {
        let raw_path = caps[2].replace('\\', "/");
        if !raw_path.to_ascii_lowercase().ends_with(".csproj") {
            continue;
        }
        entries.push(SolutionEntry {
            name: caps[1].to_string(),
            rel_path: PathBuf::from(raw_path),
            guid: caps[3].to_ascii_uppercase(),
        });
    }
    entries
}

/// Resolve a solution argument: a `.sln` file is taken as-is; a directory
/// must contain at least one `.sln` file and the first (sorted) one wins.
pub fn resolve_solution_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        let mut candidates: Vec<PathBuf> = std::fs::read_dir(path)
            .with_context(|| format!("read directory {}", path.display()))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("sln"))
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();
        return candidates
            .into_iter()
            .next()
            .with_context(|| format!("no .sln file in {}", path.display()));
    }
    anyhow::bail!("solution path does not exist: {}", path.display())
}
