use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;

/// 支援的圖片副檔名（小寫，含點）
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 6] = [".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp"];

/// 副檔名是否為支援的圖片格式（不分大小寫）
pub fn is_supported_image_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    SUPPORTED_IMAGE_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// Filesystem naming convention a path string is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Namespace {
    /// Drive-letter rooted, backslash separated (`C:\Users\me`).
    Host,
    /// POSIX, with host drives mounted under `/mnt/<letter>`.
    Guest,
}

impl Namespace {
    pub fn native() -> Self {
        if cfg!(windows) {
            Namespace::Host
        } else {
            Namespace::Guest
        }
    }

    pub fn detect(path: &str) -> Self {
        if has_drive_prefix(path) || path.starts_with("\\\\") {
            Namespace::Host
        } else {
            Namespace::Guest
        }
    }

    pub fn separator(self) -> char {
        match self {
            Namespace::Host => '\\',
            Namespace::Guest => '/',
        }
    }

    pub fn is_absolute(self, path: &str) -> bool {
        match self {
            Namespace::Host => has_drive_prefix(path) || path.starts_with("\\\\"),
            Namespace::Guest => path.starts_with('/'),
        }
    }
}

/// `X:`, `X:\...` or `X:/...`; drive-relative `X:foo` does not count.
pub(crate) fn has_drive_prefix(path: &str) -> bool {
    match path.as_bytes() {
        [letter, b':'] => letter.is_ascii_alphabetic(),
        [letter, b':', b'\\' | b'/', ..] => letter.is_ascii_alphabetic(),
        _ => false,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespacePath {
    pub namespace: Namespace,
    pub path: String,
}

impl NamespacePath {
    pub fn new(namespace: Namespace, path: impl Into<String>) -> Self {
        Self {
            namespace,
            path: path.into(),
        }
    }

    pub fn host(path: impl Into<String>) -> Self {
        Self::new(Namespace::Host, path)
    }

    pub fn guest(path: impl Into<String>) -> Self {
        Self::new(Namespace::Guest, path)
    }

    pub fn native(path: impl Into<String>) -> Self {
        Self::new(Namespace::native(), path)
    }

    /// 轉換到指定命名空間；相同時原樣返回
    pub fn into_namespace(self, target: Namespace) -> Self {
        if self.namespace == target {
            return self;
        }
        let path = match target {
            Namespace::Guest => crate::core::path_translator::to_guest(&self.path),
            Namespace::Host => crate::core::path_translator::to_host(&self.path),
        };
        Self::new(target, path)
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

/// 儲存位置解析結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveLocation {
    /// Leave the image where the capture step put it.
    TempArea,
    Directory(PathBuf),
}

/// 清理時的單一圖片檔案
#[derive(Debug, Clone)]
pub struct ImageFileRecord {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    pub scanned: usize,
    pub kept: usize,
    pub deleted: Vec<PathBuf>,
    pub failed: usize,
}

/// A file name that passed [`crate::core::filename::validate_filename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedFilename(String);

impl FinalizedFilename {
    pub fn new(raw: &str, expected_extension: &str) -> crate::utils::error::Result<Self> {
        crate::core::filename::validate_filename(raw, expected_extension)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for FinalizedFilename {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub final_path: PathBuf,
    pub reference: String,
    pub deleted_old_images: usize,
}
