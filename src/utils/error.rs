use std::fmt;
use thiserror::Error;

/// 檔名被拒絕的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameRejection {
    Empty,
    ContainsSeparator,
    ForbiddenCharacter(char),
    ReservedName,
    LeadingOrTrailingDotOrSpace,
    TooLong,
    UnsupportedExtension,
    ExtensionMismatch { expected: String },
    AlreadyExists,
}

impl fmt::Display for FilenameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "name is empty"),
            Self::ContainsSeparator => write!(f, "name contains a path separator"),
            Self::ForbiddenCharacter(c) if c.is_control() => {
                write!(f, "name contains a control character")
            }
            Self::ForbiddenCharacter(c) => write!(f, "name contains forbidden character '{}'", c),
            Self::ReservedName => write!(f, "name is a reserved device name"),
            Self::LeadingOrTrailingDotOrSpace => {
                write!(f, "name starts or ends with a dot or whitespace")
            }
            Self::TooLong => write!(f, "name is too long"),
            Self::UnsupportedExtension => write!(f, "extension is missing or not a supported image type"),
            Self::ExtensionMismatch { expected } => {
                write!(f, "extension must stay '{}'", expected)
            }
            Self::AlreadyExists => write!(f, "a file with that name already exists"),
        }
    }
}

/// 檔案搬移失敗的原因分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelocationCause {
    NotFound,
    PermissionDenied,
    DiskFull,
    Other,
}

impl RelocationCause {
    pub fn from_io(error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            std::io::ErrorKind::StorageFull => Self::DiskFull,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for RelocationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotFound => "source not found",
            Self::PermissionDenied => "permission denied",
            Self::DiskFull => "disk full",
            Self::Other => "unexpected I/O failure",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum PasteError {
    #[error("Clipboard capture is not supported on this platform")]
    PlatformUnsupported,

    #[error("No active terminal session")]
    NoActiveTerminal,

    #[error("Relative save directory requires a project root")]
    NoWorkspaceForRelativePath,

    #[error("Home directory is not available for '~' expansion")]
    NoHomeDirectory,

    #[error("Save directory contains a parent-directory reference")]
    PathTraversalRejected,

    #[error("Save directory points into a system directory")]
    SystemDirectoryRejected,

    #[error("Failed to create save directory: {detail}")]
    DirectoryCreationFailed { detail: String },

    #[error("Invalid filename prefix: {0}")]
    InvalidFilenamePrefix(FilenameRejection),

    #[error("Invalid filename: {0}")]
    InvalidFilename(FilenameRejection),

    #[error("No image found in clipboard")]
    NoImageInClipboard,

    #[error("Clipboard capture timed out after {seconds}s")]
    CaptureTimedOut { seconds: u64 },

    #[error("Clipboard capture failed: {detail}")]
    CaptureFailed { detail: String },

    #[error("Failed to move image file: {cause}")]
    FileRelocationFailed { cause: RelocationCause },

    #[error("Failed to insert text into terminal: {detail}")]
    TerminalInsertFailed { detail: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for '{field}': '{value}' - {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Platform,
    Terminal,
    Configuration,
    Clipboard,
    FileSystem,
    Validation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PasteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::PlatformUnsupported => ErrorCategory::Platform,
            Self::NoActiveTerminal | Self::TerminalInsertFailed { .. } => ErrorCategory::Terminal,
            Self::NoWorkspaceForRelativePath
            | Self::NoHomeDirectory
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::InvalidFilenamePrefix(_) => ErrorCategory::Configuration,
            Self::PathTraversalRejected
            | Self::SystemDirectoryRejected
            | Self::InvalidFilename(_) => ErrorCategory::Validation,
            Self::NoImageInClipboard | Self::CaptureTimedOut { .. } | Self::CaptureFailed { .. } => {
                ErrorCategory::Clipboard
            }
            Self::DirectoryCreationFailed { .. }
            | Self::FileRelocationFailed { .. }
            | Self::IoError(_) => ErrorCategory::FileSystem,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 剪貼簿沒有圖片屬於正常使用情境
            Self::NoImageInClipboard => ErrorSeverity::Low,
            Self::CaptureTimedOut { .. } | Self::NoActiveTerminal => ErrorSeverity::Medium,
            Self::PlatformUnsupported | Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 給使用者看的訊息，不包含路徑或系統錯誤原文
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::PlatformUnsupported => {
                "Clipboard capture is not available on this platform".to_string()
            }
            Self::NoActiveTerminal => "No active terminal to paste the image reference into".to_string(),
            Self::NoWorkspaceForRelativePath => {
                "A relative save directory needs a project folder".to_string()
            }
            Self::NoHomeDirectory => "Could not determine your home directory".to_string(),
            Self::PathTraversalRejected => {
                "Save directory must not contain '..'".to_string()
            }
            Self::SystemDirectoryRejected => {
                "Save directory must not be inside a system directory".to_string()
            }
            Self::DirectoryCreationFailed { .. } => "Could not create the save directory".to_string(),
            Self::InvalidFilenamePrefix(reason) => format!("Invalid filename prefix: {}", reason),
            Self::InvalidFilename(reason) => format!("Invalid filename: {}", reason),
            Self::NoImageInClipboard => "No image found in clipboard".to_string(),
            Self::CaptureTimedOut { .. } => "Clipboard capture timed out".to_string(),
            Self::CaptureFailed { .. } => "Failed to read the image from the clipboard".to_string(),
            Self::FileRelocationFailed { cause } => format!("Failed to save image ({})", cause),
            Self::TerminalInsertFailed { .. } => {
                "Failed to send the image reference to the terminal".to_string()
            }
            Self::ConfigValidationError { field, .. } | Self::InvalidConfigValueError { field, .. } => {
                format!("Invalid setting '{}'", field)
            }
            Self::IoError(_) => "Unexpected file system error".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::PlatformUnsupported => "Use capture_backend = \"native\" or run inside WSL",
            Self::NoActiveTerminal => "Open a terminal (or tmux session) before pasting",
            Self::NoWorkspaceForRelativePath => {
                "Run from a project folder, pass --project-root, or use an absolute save_directory"
            }
            Self::NoHomeDirectory => "Use an absolute save_directory instead of '~'",
            Self::PathTraversalRejected | Self::SystemDirectoryRejected => {
                "Choose a directory inside your project or home folder"
            }
            Self::DirectoryCreationFailed { .. } => "Check permissions of the parent directory",
            Self::InvalidFilenamePrefix(_) => "Use letters, digits, '-' or '_' in filename_prefix",
            Self::InvalidFilename(_) => "Choose a plain file name that keeps the image extension",
            Self::NoImageInClipboard => "Copy an image or an image file and try again",
            Self::CaptureTimedOut { .. } => "Try again, or raise capture_timeout_seconds",
            Self::CaptureFailed { .. } => "Run with --verbose to see the capture output",
            Self::FileRelocationFailed { .. } => "Check free space and permissions of the save directory",
            Self::TerminalInsertFailed { .. } => "Check that the tmux target exists",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Fix the value in the config file or on the command line"
            }
            Self::IoError(_) => "Run with --verbose for details",
        }
    }
}

impl PasteError {
    /// 終端機上唯一顯示的內容：分類訊息加建議，不含 detail
    pub fn user_report(&self) -> String {
        format!(
            "❌ {}\n💡 {}",
            self.user_friendly_message(),
            self.recovery_suggestion()
        )
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,      // 警告，但成功
            ErrorSeverity::Medium => 2,   // 可重試
            ErrorSeverity::High => 1,     // 處理錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }
}

pub type Result<T> = std::result::Result<T, PasteError>;
