use crate::core::filename::validate_prefix;
use crate::core::retention::MAX_RETAINED_IMAGES;
use crate::core::ConfigProvider;
use crate::utils::error::{PasteError, Result};
use crate::utils::validation::{
    clamp_range, validate_one_of, validate_path, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CAPTURE_BACKENDS: [&str; 2] = ["native", "windows-host"];
pub const TERMINALS: [&str; 2] = ["stdout", "tmux"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PasteConfig {
    /// 空字串表示使用系統暫存目錄
    pub save_directory: String,
    pub skip_rename_prompt: bool,
    pub max_images: usize,
    pub filename_prefix: String,
    pub capture_backend: String,
    pub capture_timeout_seconds: u64,
    pub terminal: String,
    pub tmux_target: Option<String>,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            save_directory: String::new(),
            skip_rename_prompt: false,
            max_images: 10,
            filename_prefix: "img_".to_string(),
            capture_backend: "native".to_string(),
            capture_timeout_seconds: 10,
            terminal: "stdout".to_string(),
            tmux_target: None,
        }
    }
}

impl PasteConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PasteError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PasteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定路徑優先；否則讀取預設位置，不存在時使用預設值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            tracing::debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("img-paste").join("config.toml"))
    }

    /// 替換環境變數 (例如 ${HOME})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            PasteError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_path("save_directory", &self.save_directory)?;
        validate_prefix(&self.filename_prefix)?;
        validate_positive_number("capture_timeout_seconds", self.capture_timeout_seconds, 1)?;
        validate_one_of("capture_backend", &self.capture_backend, &CAPTURE_BACKENDS)?;
        validate_one_of("terminal", &self.terminal, &TERMINALS)?;
        Ok(())
    }

    /// max_images 的有效範圍為 1–100
    pub fn effective_max_images(&self) -> usize {
        clamp_range("max_images", self.max_images, 1, MAX_RETAINED_IMAGES)
    }
}

impl ConfigProvider for PasteConfig {
    fn save_directory(&self) -> &str {
        &self.save_directory
    }

    fn skip_rename_prompt(&self) -> bool {
        self.skip_rename_prompt
    }

    fn max_images(&self) -> usize {
        self.effective_max_images()
    }

    fn filename_prefix(&self) -> &str {
        &self.filename_prefix
    }
}

impl Validate for PasteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
