// Workspace layer: owns the loaded solution graph, the document cache, and
// the semantic index derived from them. The active state is replaced
// atomically at the end of a successful load or commit; readers between
// requests only ever observe a complete state.

pub mod project;
pub mod solution;

use crate::config::Config;
use crate::logging;
use crate::semantics::SemanticIndex;
use crate::syntax;
use crate::util;
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub use project::PackageRef;

/// Stable address of a document: project index + document index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocKey {
    pub project: usize,
    pub document: usize,
}

#[derive(Debug)]
pub struct Document {
    /// Project-relative file name.
    pub name: String,
    /// Folder segments between the project directory and the file.
    pub folders: Vec<String>,
    /// Absent for in-memory documents, which path lookups ignore.
    pub path: Option<PathBuf>,
    pub canonical_path: Option<String>,
    pub text: String,
    pub tree: tree_sitter::Tree,
}

#[derive(Debug, Clone)]
pub struct ProjectRef {
    /// Absolute path of the referenced project file.
    pub path: PathBuf,
    /// Name of the referenced project when it belongs to this solution.
    pub name: Option<String>,
}

impl ProjectRef {
    /// Display name for outputs; unresolved references report "Unknown".
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

#[derive(Debug)]
pub struct Project {
    pub name: String,
    pub guid: String,
    pub path: PathBuf,
    pub canonical_path: String,
    pub language: &'static str,
    pub documents: Vec<Document>,
    pub project_refs: Vec<ProjectRef>,
    pub package_refs: Vec<PackageRef>,
}

#[derive(Debug)]
pub struct Solution {
    pub path: PathBuf,
    pub loaded_at: SystemTime,
    pub projects: Vec<Project>,
}

impl Solution {
    pub fn document(&self, key: DocKey) -> &Document {
        &self.projects[key.project].documents[key.document]
    }

    pub fn document_count(&self) -> usize {
        self.projects.iter().map(|p| p.documents.len()).sum()
    }

    pub fn doc_keys(&self) -> impl Iterator<Item = DocKey> + '_ {
        self.projects.iter().enumerate().flat_map(|(pi, project)| {
            (0..project.documents.len()).map(move |di| DocKey {
                project: pi,
                document: di,
            })
        })
    }

    pub fn loaded_at_epoch_secs(&self) -> u64 {
        self.loaded_at
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

pub struct LoadedState {
    pub solution: Solution,
    pub index: SemanticIndex,
    cache: HashMap<String, DocKey>,
    cache_enabled: bool,
}

impl LoadedState {
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub project_count: usize,
    pub document_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    NoSolution,
    NotFound(String),
}

#[derive(Debug, Clone)]
pub enum CommitChange {
    Write { path: PathBuf, text: String },
    Remove { path: PathBuf },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub path: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Workspace {
    config: Config,
    state: Option<LoadedState>,
}

impl Workspace {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn loaded(&self) -> Option<&LoadedState> {
        self.state.as_ref()
    }

    /// Tear down prior state, open the solution, and publish the new state.
    /// Per-project and per-document problems are logged, never fatal.
    pub fn load(&mut self, path: &Path) -> Result<LoadSummary> {
        self.state = None;

        let sln_path = solution::resolve_solution_file(path)?;
        let sln_dir = sln_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let source = util::read_to_string(&sln_path)?;
        let entries = solution::parse(&source);

        let mut parser = syntax::new_parser()?;
        let mut projects = Vec::new();
        for entry in &entries {
            let project_path = sln_dir.join(&entry.rel_path);
            match load_project(&mut parser, entry, &project_path) {
                Ok(project) => projects.push(project),
                Err(err) => {
                    logging::warn(&format!(
                        "skipping project {}: {err:#}",
                        project_path.display()
                    ));
                }
            }
        }
        resolve_project_refs(&mut projects);

        let solution = Solution {
            path: sln_path,
            loaded_at: SystemTime::now(),
            projects,
        };
        let summary = LoadSummary {
            project_count: solution.projects.len(),
            document_count: solution.document_count(),
        };
        let index = SemanticIndex::build(&solution);
        logging::info(&format!(
            "loaded {} with {} projects, {} documents, {} symbols",
            solution.path.display(),
            summary.project_count,
            summary.document_count,
            index.symbols.len()
        ));

        self.state = Some(LoadedState {
            solution,
            index,
            cache: HashMap::new(),
            cache_enabled: self.config.semantic_cache_enabled,
        });
        Ok(summary)
    }

    /// Canonical-path document lookup. A cache hit and a full scan always
    /// agree because the cache only ever stores keys the scan produced.
    pub fn document(&mut self, path: &str) -> Result<DocKey, LookupError> {
        let state = self.state.as_mut().ok_or(LookupError::NoSolution)?;
        let canonical = util::canonical_path(Path::new(path));
        if state.cache_enabled {
            if let Some(key) = state.cache.get(&canonical) {
                return Ok(*key);
            }
        }
        for (pi, project) in state.solution.projects.iter().enumerate() {
            for (di, doc) in project.documents.iter().enumerate() {
                if doc.canonical_path.as_deref() == Some(canonical.as_str()) {
                    let key = DocKey {
                        project: pi,
                        document: di,
                    };
                    if state.cache_enabled {
                        state.cache.insert(canonical, key);
                    }
                    return Ok(key);
                }
            }
        }
        Err(LookupError::NotFound(path.to_string()))
    }

    /// Write committed edits to disk and update the in-memory solution,
    /// then rebuild the index and republish once. Best-effort: failures are
    /// reported per file and already-written files stay written.
    pub fn commit(&mut self, changes: &[CommitChange]) -> Result<Vec<FileStatus>> {
        let mut statuses = Vec::new();
        let mut applied: Vec<&CommitChange> = Vec::new();
        for change in changes {
            match change {
                CommitChange::Write { path, text } => match std::fs::write(path, text) {
                    Ok(()) => {
                        statuses.push(FileStatus {
                            path: path.display().to_string(),
                            status: "written",
                            error: None,
                        });
                        applied.push(change);
                    }
                    Err(err) => statuses.push(FileStatus {
                        path: path.display().to_string(),
                        status: "failed",
                        error: Some(err.to_string()),
                    }),
                },
                CommitChange::Remove { path } => match std::fs::remove_file(path) {
                    Ok(()) => {
                        statuses.push(FileStatus {
                            path: path.display().to_string(),
                            status: "removed",
                            error: None,
                        });
                        applied.push(change);
                    }
                    Err(err) => statuses.push(FileStatus {
                        path: path.display().to_string(),
                        status: "failed",
                        error: Some(err.to_string()),
                    }),
                },
            }
        }

        if let Some(state) = self.state.as_mut() {
            let mut parser = syntax::new_parser()?;
            for change in applied {
                match change {
                    CommitChange::Write { path, text } => {
                        update_document(state, &mut parser, path, Some(text.clone()));
                    }
                    CommitChange::Remove { path } => {
                        update_document(state, &mut parser, path, None);
                    }
                }
            }
            state.index = SemanticIndex::build(&state.solution);
            state.cache.clear();
        }
        Ok(statuses)
    }
}

fn load_project(
    parser: &mut tree_sitter::Parser,
    entry: &solution::SolutionEntry,
    project_path: &Path,
) -> Result<Project> {
    let source = util::read_to_string(project_path)?;
    let parsed = project::parse(&source);
    let project_dir = project_path
        .parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("project path has no parent: {}", project_path.display()))?;

    let mut documents = Vec::new();
    for file in project::source_files(&project_dir, &parsed)? {
        let text = match util::read_to_string(&file) {
            Ok(text) => text,
            Err(err) => {
                logging::warn(&format!("skipping document: {err:#}"));
                continue;
            }
        };
        let Some(tree) = parser.parse(&text, None) else {
            logging::warn(&format!("parser produced no tree for {}", file.display()));
            continue;
        };
        let rel = file.strip_prefix(&project_dir).unwrap_or(&file);
        let folders: Vec<String> = rel
            .parent()
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        documents.push(Document {
            name,
            folders,
            canonical_path: Some(util::canonical_path(&file)),
            path: Some(file),
            text,
            tree,
        });
    }

    let project_refs = parsed
        .project_refs
        .iter()
        .map(|rel| ProjectRef {
            path: project_dir.join(rel),
            name: None,
        })
        .collect();

    Ok(Project {
        name: entry.name.clone(),
        guid: entry.guid.clone(),
        canonical_path: util::canonical_path(project_path),
        path: project_path.to_path_buf(),
        language: "C#",
        documents,
        project_refs,
        package_refs: parsed.package_refs,
    })
}

fn resolve_project_refs(projects: &mut [Project]) {
    let by_canonical: HashMap<String, String> = projects
        .iter()
        .map(|p| (p.canonical_path.clone(), p.name.clone()))
        .collect();
    for project in projects.iter_mut() {
        for pref in project.project_refs.iter_mut() {
            let canonical = util::canonical_path(&pref.path);
            pref.name = by_canonical.get(&canonical).cloned();
        }
    }
}

fn update_document(
    state: &mut LoadedState,
    parser: &mut tree_sitter::Parser,
    path: &Path,
    new_text: Option<String>,
) {
    let canonical = util::canonical_path(path);
    let mut found: Option<DocKey> = None;
    for (pi, project) in state.solution.projects.iter().enumerate() {
        for (di, doc) in project.documents.iter().enumerate() {
            if doc.canonical_path.as_deref() == Some(canonical.as_str()) {
                found = Some(DocKey {
                    project: pi,
                    document: di,
                });
            }
        }
    }
    match (found, new_text) {
        (Some(key), Some(text)) => {
            if let Some(tree) = parser.parse(&text, None) {
                let doc = &mut state.solution.projects[key.project].documents[key.document];
                doc.text = text;
                doc.tree = tree;
            }
        }
        (Some(key), None) => {
            state.solution.projects[key.project].documents.remove(key.document);
        }
        (None, Some(text)) => {
            // A new file: attach it to the project whose directory contains it.
            let owner = state.solution.projects.iter().position(|p| {
                p.path
                    .parent()
                    .map(|dir| path.starts_with(dir))
                    .unwrap_or(false)
            });
            let Some(pi) = owner else {
                logging::warn(&format!(
                    "written file {} belongs to no loaded project",
                    path.display()
                ));
                return;
            };
            let Some(tree) = parser.parse(&text, None) else {
                return;
            };
            let Some(project_dir) = state.solution.projects[pi].path.parent() else {
                return;
            };
            let rel = path.strip_prefix(project_dir).unwrap_or(path);
            let folders = rel
                .parent()
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy().to_string())
                        .collect()
                })
                .unwrap_or_default();
            state.solution.projects[pi].documents.push(Document {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                folders,
                canonical_path: Some(canonical),
                path: Some(path.to_path_buf()),
                text,
                tree,
            });
        }
        (None, None) => {}
    }
}
