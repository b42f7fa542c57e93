use anyhow::{Context, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Canonical string form of a path used as the document-lookup key:
/// absolute, `.`/`..` resolved lexically, forward slashes, case-folded on
/// platforms with case-insensitive filesystems.
pub fn canonical_path(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut parts: Vec<String> = Vec::new();
    for comp in absolute.components() {
        match comp {
            Component::Prefix(prefix) => parts.push(prefix.as_os_str().to_string_lossy().to_string()),
            Component::RootDir => parts.push(String::new()),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.len() > 1 {
                    parts.pop();
                }
            }
            Component::Normal(os) => parts.push(os.to_string_lossy().to_string()),
        }
    }
    let joined = parts.join("/");
    if cfg!(any(windows, target_os = "macos")) {
        joined.to_lowercase()
    } else {
        joined
    }
}

/// Byte offset for a 0-based (line, column) position. Columns count bytes
/// within the line, matching tree-sitter points. `None` when out of range.
pub fn offset_for_position(text: &str, line: usize, column: usize) -> Option<usize> {
    let mut start = 0usize;
    for (index, raw) in text.split('\n').enumerate() {
        if index == line {
            if column > raw.len() {
                return None;
            }
            return Some(start + column);
        }
        start += raw.len() + 1;
    }
    None
}

pub fn line_text(text: &str, line: usize) -> Option<&str> {
    text.split('\n').nth(line)
}

/// Single-line excerpt: whitespace runs collapsed, trimmed, byte-capped.
pub fn excerpt(raw: &str) -> String {
    let mut out = String::new();
    let mut last_space = false;
    for ch in raw.chars() {
        if ch.is_whitespace() {
            if !last_space {
                out.push(' ');
                last_space = true;
            }
        } else {
            out.push(ch);
            last_space = false;
        }
    }
    truncate_str_bytes(out.trim(), 200)
}

pub fn truncate_str_bytes(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes.min(value.len());
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Wall-clock bound for solution-wide scans.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    pub fn new(seconds: u64) -> Self {
        Self {
            started: Instant::now(),
            limit: Duration::from_secs(seconds),
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.started.elapsed() > self.limit {
            anyhow::bail!(
                "operation exceeded the {}s timeout",
                self.limit.as_secs()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_path_resolves_dots() {
        let canon = canonical_path(Path::new("/a/b/../c/./d.cs"));
        assert_eq!(canon, "/a/c/d.cs");
    }

    #[test]
    fn offset_for_position_counts_lines() {
        let text = "ab\ncde\n";
        assert_eq!(offset_for_position(text, 0, 0), Some(0));
        assert_eq!(offset_for_position(text, 1, 2), Some(5));
        assert_eq!(offset_for_position(text, 1, 3), Some(6));
        assert_eq!(offset_for_position(text, 1, 4), None);
        assert_eq!(offset_for_position(text, 9, 0), None);
    }

    #[test]
    fn excerpt_collapses_whitespace() {
        assert_eq!(excerpt("  var  x =\t1;  "), "var x = 1;");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let value = "héllo";
        let cut = truncate_str_bytes(value, 2);
        assert_eq!(cut, "h");
    }

    #[test]
    fn deadline_fresh_is_ok() {
        assert!(Deadline::new(30).check().is_ok());
    }
}
