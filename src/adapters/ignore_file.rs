use crate::domain::ports::IgnoreRegistrar;
use std::io::Write;
use std::path::Path;

pub const GITIGNORE_FILE: &str = ".gitignore";

/// 將圖片目錄加入專案的 .gitignore（已存在則不重複加入）
#[derive(Debug, Clone, Default)]
pub struct GitignoreRegistrar;

impl GitignoreRegistrar {
    pub fn new() -> Self {
        Self
    }

    fn contains_entry(content: &str, entry: &str) -> bool {
        let wanted = entry.trim().trim_start_matches('/').trim_end_matches('/');
        content.lines().map(str::trim).any(|line| {
            !line.starts_with('#') && line.trim_start_matches('/').trim_end_matches('/') == wanted
        })
    }

    fn append(root: &Path, entry: &str) -> std::io::Result<bool> {
        let path = root.join(GITIGNORE_FILE);
        let existing = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        if Self::contains_entry(&existing, entry) {
            return Ok(false);
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file, "{}", entry)?;
        Ok(true)
    }
}

impl IgnoreRegistrar for GitignoreRegistrar {
    fn ensure_ignored(&self, root: &Path, entry: &str) {
        match Self::append(root, entry) {
            Ok(true) => tracing::info!("📝 Added '{}' to {}", entry, GITIGNORE_FILE),
            Ok(false) => tracing::debug!("'{}' already in {}", entry, GITIGNORE_FILE),
            Err(e) => tracing::warn!("Could not update {}: {}", GITIGNORE_FILE, e),
        }
    }
}

/// Registrar that does nothing; used when the save directory is outside any project.
#[derive(Debug, Clone, Default)]
pub struct NoopRegistrar;

impl IgnoreRegistrar for NoopRegistrar {
    fn ensure_ignored(&self, _root: &Path, _entry: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_gitignore() {
        let temp = TempDir::new().unwrap();
        GitignoreRegistrar::new().ensure_ignored(temp.path(), "images/");

        let content = std::fs::read_to_string(temp.path().join(GITIGNORE_FILE)).unwrap();
        assert_eq!(content, "images/\n");
    }

    #[test]
    fn test_is_idempotent() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(GITIGNORE_FILE), "target\n/images").unwrap();

        let registrar = GitignoreRegistrar::new();
        registrar.ensure_ignored(temp.path(), "images/");
        registrar.ensure_ignored(temp.path(), "images/");

        let content = std::fs::read_to_string(temp.path().join(GITIGNORE_FILE)).unwrap();
        assert_eq!(content, "target\n/images");
    }

    #[test]
    fn test_appends_after_missing_newline() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(GITIGNORE_FILE), "target").unwrap();

        GitignoreRegistrar::new().ensure_ignored(temp.path(), ".claude-images/");

        let content = std::fs::read_to_string(temp.path().join(GITIGNORE_FILE)).unwrap();
        assert_eq!(content, "target\n.claude-images/\n");
    }

    #[test]
    fn test_commented_entry_does_not_count() {
        assert!(!GitignoreRegistrar::contains_entry("# images/\n", "images/"));
        assert!(GitignoreRegistrar::contains_entry("images\n", "images/"));
    }

    #[test]
    fn test_failure_is_swallowed() {
        let temp = TempDir::new().unwrap();
        // root 不存在也不應 panic
        GitignoreRegistrar::new().ensure_ignored(&temp.path().join("missing"), "images/");
    }
}
