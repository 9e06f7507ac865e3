use crate::domain::model::SUPPORTED_IMAGE_EXTENSIONS;
use crate::utils::error::{FilenameRejection, PasteError, Result};

/// Windows 保留的裝置名稱
pub const RESERVED_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub const FORBIDDEN_FILENAME_CHARS: [char; 8] = ['<', '>', ':', '"', '|', '?', '*', '\0'];

pub const MAX_FILENAME_UNITS: usize = 255;
pub const MAX_PREFIX_UNITS: usize = 100;

fn check_separators(name: &str) -> std::result::Result<(), FilenameRejection> {
    if name.contains('/') || name.contains('\\') {
        return Err(FilenameRejection::ContainsSeparator);
    }
    Ok(())
}

fn check_characters(name: &str) -> std::result::Result<(), FilenameRejection> {
    match name
        .chars()
        .find(|c| FORBIDDEN_FILENAME_CHARS.contains(c) || c.is_control())
    {
        Some(c) => Err(FilenameRejection::ForbiddenCharacter(c)),
        None => Ok(()),
    }
}

fn is_reserved_device_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name);
    RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}

fn is_edge_char(c: char) -> bool {
    c == '.' || c.is_whitespace()
}

/// 取得小寫副檔名（含點），例如 `.png`
pub fn extension_of(name: &str) -> Option<String> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(name[idx..].to_ascii_lowercase())
}

fn check_filename(name: &str, expected_extension: &str) -> std::result::Result<(), FilenameRejection> {
    if name.trim().is_empty() {
        return Err(FilenameRejection::Empty);
    }
    check_separators(name)?;
    check_characters(name)?;
    if is_reserved_device_name(name) {
        return Err(FilenameRejection::ReservedName);
    }
    if name.starts_with(is_edge_char) || name.ends_with(is_edge_char) {
        return Err(FilenameRejection::LeadingOrTrailingDotOrSpace);
    }
    if name.encode_utf16().count() > MAX_FILENAME_UNITS {
        return Err(FilenameRejection::TooLong);
    }

    let extension = extension_of(name)
        .filter(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(FilenameRejection::UnsupportedExtension)?;

    let expected = expected_extension.to_ascii_lowercase();
    let expected = if expected.starts_with('.') {
        expected
    } else {
        format!(".{}", expected)
    };
    if extension != expected {
        return Err(FilenameRejection::ExtensionMismatch { expected });
    }

    Ok(())
}

/// 驗證使用者輸入的檔名，第一個失敗的規則即回報
pub fn validate_filename(name: &str, expected_extension: &str) -> Result<()> {
    check_filename(name, expected_extension).map_err(PasteError::InvalidFilename)
}

/// 驗證設定中的檔名前綴；空字串允許
pub fn validate_prefix(prefix: &str) -> Result<()> {
    let check = || -> std::result::Result<(), FilenameRejection> {
        if prefix.is_empty() {
            return Ok(());
        }
        check_separators(prefix)?;
        check_characters(prefix)?;
        if prefix.starts_with(is_edge_char) {
            return Err(FilenameRejection::LeadingOrTrailingDotOrSpace);
        }
        if prefix.encode_utf16().count() > MAX_PREFIX_UNITS {
            return Err(FilenameRejection::TooLong);
        }
        Ok(())
    };
    check().map_err(PasteError::InvalidFilenamePrefix)
}
