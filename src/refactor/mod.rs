// Refactoring engine plumbing. Every write-capable operation runs preview
// first in spirit: handlers build PendingChanges, render them as an
// EditPlan, and only call `commit` when preview was explicitly disabled.

pub mod codefix;
pub mod extract_interface;
pub mod format;
pub mod plan;
pub mod rename;
pub mod usings;

use crate::model::ChangeType;
use crate::workspace::{CommitChange, FileStatus, Workspace};
use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Summary,
    Compact,
    Full,
}

impl Verbosity {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "summary" => Verbosity::Summary,
            Some(v) if v == "full" => Verbosity::Full,
            _ => Verbosity::Compact,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PendingChange {
    pub path: PathBuf,
    pub change_type: ChangeType,
    /// Pre-change text; empty for additions.
    pub old_text: String,
    /// Post-change text; None for removals.
    pub new_text: Option<String>,
}

#[derive(Debug)]
pub struct ApplyReport {
    pub files: Vec<FileStatus>,
    pub first_failure: Option<String>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> bool {
        self.first_failure.is_none()
    }
}

/// Write all changes to disk and republish the workspace state once.
/// Best-effort: the first failing file is reported, written files are not
/// rolled back.
pub fn commit(workspace: &mut Workspace, changes: &[PendingChange]) -> Result<ApplyReport> {
    let commit_changes: Vec<CommitChange> = changes
        .iter()
        .map(|change| match (&change.change_type, &change.new_text) {
            (ChangeType::Removed, _) | (_, None) => CommitChange::Remove {
                path: change.path.clone(),
            },
            (_, Some(text)) => CommitChange::Write {
                path: change.path.clone(),
                text: text.clone(),
            },
        })
        .collect();
    let files = workspace.commit(&commit_changes)?;
    let first_failure = files
        .iter()
        .find(|f| f.status == "failed")
        .map(|f| f.path.clone());
    Ok(ApplyReport {
        files,
        first_failure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_defaults_to_compact() {
        assert_eq!(Verbosity::parse(None), Verbosity::Compact);
        assert_eq!(Verbosity::parse(Some("summary")), Verbosity::Summary);
        assert_eq!(Verbosity::parse(Some("FULL")), Verbosity::Full);
        assert_eq!(Verbosity::parse(Some("bogus")), Verbosity::Compact);
    }
}
