use crate::core::path_translator;
use crate::domain::model::{Namespace, NamespacePath, SaveLocation};
use crate::domain::ports::IgnoreRegistrar;
use crate::utils::error::{PasteError, Result};
use std::path::{Path, PathBuf};

/// Guest 系統目錄（小寫、無結尾斜線）
pub const GUEST_SYSTEM_DIRECTORIES: [&str; 8] =
    ["/etc", "/sys", "/proc", "/bin", "/sbin", "/usr", "/var", "/root"];

/// 任一磁碟根目錄下的 Windows 系統目錄（小寫）
pub const HOST_SYSTEM_DIRECTORIES: [&str; 2] = ["windows", "program files"];

const PARENT_DIRECTORY_TOKEN: &str = "..";

/// Directory chosen for a raw setting, before anything touches the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryPlan {
    /// Absolute directory in the target namespace.
    pub directory: String,
    /// `(project root, entry)` to register in the ignore-file, for relative settings.
    pub ignore: Option<(String, String)>,
}

/// 只做字串層面的解析（規則 1–6），不存取檔案系統
pub fn plan_directory(
    raw_directory: &str,
    project_root: Option<&str>,
    target: Namespace,
    home: Option<&str>,
) -> Result<Option<DirectoryPlan>> {
    let raw = raw_directory.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    check_deny_rules(raw)?;

    if let Some(rest) = strip_home_marker(raw) {
        let home = home.ok_or(PasteError::NoHomeDirectory)?;
        let home = NamespacePath::new(Namespace::detect(home), home).into_namespace(target);
        return Ok(Some(DirectoryPlan {
            directory: join(&home.path, rest, target),
            ignore: None,
        }));
    }

    if Namespace::detect(raw).is_absolute(raw) {
        let absolute = NamespacePath::new(Namespace::detect(raw), raw).into_namespace(target);
        return Ok(Some(DirectoryPlan {
            directory: absolute.path,
            ignore: None,
        }));
    }

    let root = project_root
        .map(str::trim)
        .filter(|root| !root.is_empty())
        .ok_or(PasteError::NoWorkspaceForRelativePath)?;
    let root = NamespacePath::new(Namespace::detect(root), root).into_namespace(target);
    let entry = ignore_entry(raw);
    Ok(Some(DirectoryPlan {
        directory: join(&root.path, raw, target),
        ignore: (!entry.is_empty()).then(|| (root.path, entry)),
    }))
}

/// 把使用者設定的儲存目錄解析成經過驗證的絕對路徑
pub struct SaveDirectoryResolver<'a> {
    registrar: &'a dyn IgnoreRegistrar,
}

impl<'a> SaveDirectoryResolver<'a> {
    pub fn new(registrar: &'a dyn IgnoreRegistrar) -> Self {
        Self { registrar }
    }

    /// Plans the directory, registers relative settings in the ignore-file and
    /// creates the directory when missing.
    pub fn resolve(
        &self,
        raw_directory: &str,
        project_root: Option<&str>,
        target: Namespace,
        home: Option<&str>,
    ) -> Result<SaveLocation> {
        let Some(plan) = plan_directory(raw_directory, project_root, target, home)? else {
            return Ok(SaveLocation::TempArea);
        };

        if let Some((root, entry)) = &plan.ignore {
            self.registrar.ensure_ignored(Path::new(root), entry);
        }

        let directory = PathBuf::from(plan.directory);
        ensure_directory(&directory)?;
        tracing::debug!("Save directory resolved to {}", directory.display());
        Ok(SaveLocation::Directory(directory))
    }
}

/// 路徑穿越與系統目錄檢查（規則 2–4）
pub fn check_deny_rules(raw: &str) -> Result<()> {
    if raw.contains(PARENT_DIRECTORY_TOKEN) {
        return Err(PasteError::PathTraversalRejected);
    }

    let normalized = normalize_for_matching(raw);
    if is_guest_system_directory(&normalized) {
        return Err(PasteError::SystemDirectoryRejected);
    }
    if is_host_system_directory(&normalized)
        || is_host_system_directory(&normalize_for_matching(&path_translator::to_host(&normalized)))
    {
        return Err(PasteError::SystemDirectoryRejected);
    }
    Ok(())
}

/// `C:\.\Windows` -> `c:/windows`, `//./etc/` -> `/etc`
///
/// Lowercases, unifies separators, collapses repeated separators and drops
/// `.` segments so that every spelling of a directory matches the deny lists.
fn normalize_for_matching(raw: &str) -> String {
    let unified = raw.to_lowercase().replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    let joined = segments.join("/");
    if unified.starts_with('/') {
        format!("/{}", joined)
    } else if segments.len() == 1 && segments[0].ends_with(':') {
        format!("{}/", joined)
    } else {
        joined
    }
}

fn is_guest_system_directory(normalized: &str) -> bool {
    GUEST_SYSTEM_DIRECTORIES.iter().any(|dir| {
        normalized
            .strip_prefix(dir)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// `<letter>:/windows...` or `<letter>:/program files...`, matched as a plain prefix
fn is_host_system_directory(normalized: &str) -> bool {
    let bytes = normalized.as_bytes();
    if bytes.len() < 3 || !bytes[0].is_ascii_alphabetic() || bytes[1] != b':' || bytes[2] != b'/' {
        return false;
    }
    let below_root = &normalized[3..];
    HOST_SYSTEM_DIRECTORIES
        .iter()
        .any(|dir| below_root.starts_with(dir))
}

/// `~`, `~/x`, `~\x` -> remainder after the marker
fn strip_home_marker(raw: &str) -> Option<&str> {
    let rest = raw.strip_prefix('~')?;
    if rest.is_empty() {
        Some(rest)
    } else if rest.starts_with('/') || rest.starts_with('\\') {
        Some(&rest[1..])
    } else {
        None
    }
}

fn join(base: &str, relative: &str, target: Namespace) -> String {
    let sep = target.separator();
    let relative = relative
        .trim_start_matches("./")
        .trim_start_matches(".\\")
        .replace(['/', '\\'], &sep.to_string());
    let relative = relative.trim_matches(sep);
    let base = base.trim_end_matches(sep);
    if relative.is_empty() {
        base.to_string()
    } else {
        format!("{}{}{}", base, sep, relative)
    }
}

/// `./shots\2024/` -> `shots/2024/`
pub fn ignore_entry(raw: &str) -> String {
    let unified = raw.trim().replace('\\', "/");
    let trimmed = unified.trim_start_matches("./").trim_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

fn ensure_directory(directory: &Path) -> Result<()> {
    if directory.is_dir() {
        return Ok(());
    }

    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }

    builder.create(directory).map_err(|e| {
        tracing::debug!("Failed to create {}: {}", directory.display(), e);
        PasteError::DirectoryCreationFailed {
            detail: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRegistrar {
        calls: Mutex<Vec<(PathBuf, String)>>,
    }

    impl IgnoreRegistrar for RecordingRegistrar {
        fn ensure_ignored(&self, root: &Path, entry: &str) {
            self.calls
                .lock()
                .unwrap()
                .push((root.to_path_buf(), entry.to_string()));
        }
    }

    #[test]
    fn test_empty_uses_temp_area() {
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);
        for root in [None, Some("/home/u/proj")] {
            for home in [None, Some("/home/u")] {
                assert_eq!(
                    resolver.resolve("  ", root, Namespace::Guest, home).unwrap(),
                    SaveLocation::TempArea
                );
            }
        }
        assert!(registrar.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_traversal_wins_over_everything() {
        for raw in ["..", "../x", "a/../b", "/etc/..", "~/..", "C:\\Windows\\..", "foo..bar"] {
            assert!(
                matches!(check_deny_rules(raw), Err(PasteError::PathTraversalRejected)),
                "{}",
                raw
            );
        }
    }

    #[test]
    fn test_guest_system_directories() {
        for raw in ["/etc", "/etc/foo", "/ETC/foo", "\\usr\\local", "/var/", "/root/x"] {
            assert!(
                matches!(check_deny_rules(raw), Err(PasteError::SystemDirectoryRejected)),
                "{}",
                raw
            );
        }
        assert!(check_deny_rules("/etcetera").is_ok());
        assert!(check_deny_rules("/home/u/images").is_ok());
    }

    #[test]
    fn test_host_system_directories() {
        for raw in [
            "C:\\Windows",
            "d:\\windows\\temp",
            "C:/Program Files/app",
            "e:\\PROGRAM FILES (x86)",
            "/mnt/c/Windows/System32",
        ] {
            assert!(
                matches!(check_deny_rules(raw), Err(PasteError::SystemDirectoryRejected)),
                "{}",
                raw
            );
        }
        assert!(check_deny_rules("C:\\Users\\me\\images").is_ok());
        assert!(matches!(
            check_deny_rules("D:\\WindowsBackup"),
            Err(PasteError::SystemDirectoryRejected)
        ));
        assert!(check_deny_rules("D:\\Work\\Windows").is_ok());
    }

    #[test]
    fn test_system_directories_in_any_spelling() {
        for raw in [
            "//etc",
            "/./etc/x",
            "//usr/local",
            "/etc//",
            "/./proc/./self",
            "C:\\\\Windows",
            "C:\\.\\Windows",
            "c:/./program files//app",
            "/mnt/c//windows",
            "/mnt/c/./Windows/System32",
        ] {
            assert!(
                matches!(check_deny_rules(raw), Err(PasteError::SystemDirectoryRejected)),
                "{}",
                raw
            );
        }
        assert!(check_deny_rules("//home/u/./images").is_ok());
    }

    #[test]
    fn test_normalize_for_matching() {
        assert_eq!(normalize_for_matching("//./ETC/"), "/etc");
        assert_eq!(normalize_for_matching("C:\\\\.\\Windows\\"), "c:/windows");
        assert_eq!(normalize_for_matching("C:\\"), "c:/");
        assert_eq!(normalize_for_matching("./shots//2024"), "shots/2024");
    }

    #[test]
    fn test_resolve_rejects_doubled_separator_system_path() {
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);
        let result = resolver.resolve("//proc/self", Some("/tmp"), Namespace::Guest, None);
        assert!(matches!(result, Err(PasteError::SystemDirectoryRejected)));
    }

    #[test]
    fn test_relative_requires_project_root() {
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);
        let result = resolver.resolve("images", None, Namespace::Guest, None);
        assert!(matches!(result, Err(PasteError::NoWorkspaceForRelativePath)));
    }

    #[test]
    fn test_home_requires_home_directory() {
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);
        let result = resolver.resolve("~/images", Some("/tmp"), Namespace::Guest, None);
        assert!(matches!(result, Err(PasteError::NoHomeDirectory)));
    }

    #[test]
    fn test_relative_is_anchored_and_registered() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_str().unwrap();
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);

        let location = resolver
            .resolve("./shots/2024/", Some(root), Namespace::Guest, None)
            .unwrap();

        let expected = temp.path().join("shots").join("2024");
        assert_eq!(location, SaveLocation::Directory(expected.clone()));
        assert!(expected.is_dir());

        let calls = registrar.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "shots/2024/");
    }

    #[test]
    fn test_home_expansion_is_not_registered() {
        let home = TempDir::new().unwrap();
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);

        let location = resolver
            .resolve(
                "~/pasted",
                None,
                Namespace::Guest,
                Some(home.path().to_str().unwrap()),
            )
            .unwrap();

        assert_eq!(location, SaveLocation::Directory(home.path().join("pasted")));
        assert!(registrar.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_absolute_is_used_as_is() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("abs");
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);

        let location = resolver
            .resolve(target.to_str().unwrap(), None, Namespace::Guest, None)
            .unwrap();

        assert_eq!(location, SaveLocation::Directory(target.clone()));
        assert!(target.is_dir());
        assert!(registrar.calls.lock().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_created_directory_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);
        resolver
            .resolve("private", Some(temp.path().to_str().unwrap()), Namespace::Guest, None)
            .unwrap();

        let mode = std::fs::metadata(temp.path().join("private"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_creation_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let registrar = RecordingRegistrar::default();
        let resolver = SaveDirectoryResolver::new(&registrar);

        let result = resolver.resolve(
            "file/sub",
            Some(temp.path().to_str().unwrap()),
            Namespace::Guest,
            None,
        );
        assert!(matches!(result, Err(PasteError::DirectoryCreationFailed { .. })));
    }

    #[test]
    fn test_plan_translates_anchor_into_target() {
        let plan = plan_directory("imgs", Some("C:\\Users\\u\\proj"), Namespace::Guest, None)
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "/mnt/c/Users/u/proj/imgs");
        assert_eq!(
            plan.ignore,
            Some(("/mnt/c/Users/u/proj".to_string(), "imgs/".to_string()))
        );

        let plan = plan_directory("imgs\\2024", Some("/mnt/d/work"), Namespace::Host, None)
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "D:\\work\\imgs\\2024");
    }

    #[test]
    fn test_plan_translates_absolute_and_home() {
        let plan = plan_directory("D:\\shots", None, Namespace::Guest, None)
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "/mnt/d/shots");
        assert_eq!(plan.ignore, None);

        let plan = plan_directory("~", None, Namespace::Guest, Some("/home/u"))
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "/home/u");

        let plan = plan_directory("~\\pics", None, Namespace::Host, Some("/mnt/c/Users/u"))
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "C:\\Users\\u\\pics");
    }

    #[test]
    fn test_plan_claude_images_in_project() {
        let plan = plan_directory(".claude-images", Some("/home/u/proj"), Namespace::Guest, Some("/home/u"))
            .unwrap()
            .unwrap();
        assert_eq!(plan.directory, "/home/u/proj/.claude-images");
        assert_eq!(
            plan.ignore,
            Some(("/home/u/proj".to_string(), ".claude-images/".to_string()))
        );
    }

    #[test]
    fn test_join_follows_target_separator() {
        assert_eq!(join("C:\\proj\\", "a/b", Namespace::Host), "C:\\proj\\a\\b");
        assert_eq!(join("/home/u/proj", ".\\imgs", Namespace::Guest), "/home/u/proj/imgs");
    }

    #[test]
    fn test_ignore_entry() {
        assert_eq!(ignore_entry(".claude-images"), ".claude-images/");
        assert_eq!(ignore_entry("./a\\b/"), "a/b/");
        assert_eq!(ignore_entry("./"), "");
    }
}
