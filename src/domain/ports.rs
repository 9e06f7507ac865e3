use crate::domain::model::NamespacePath;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// 擷取剪貼簿圖片並寫成暫存檔
#[async_trait]
pub trait ClipboardCapture: Send + Sync {
    /// Whether this backend can run on the current platform.
    fn is_supported(&self) -> bool {
        true
    }

    /// Writes the clipboard image (or a copy of a copied image file) into a
    /// temporary directory and returns its path.
    async fn capture(&self) -> Result<NamespacePath>;
}

#[async_trait]
pub trait TerminalSink: Send + Sync {
    fn is_active(&self) -> bool;
    async fn insert_text(&self, text: &str) -> Result<()>;
}

/// 登記忽略清單（例如 .gitignore），失敗只記錄不回報
pub trait IgnoreRegistrar: Send + Sync {
    fn ensure_ignored(&self, root: &Path, entry: &str);
}

pub trait RenamePrompt: Send + Sync {
    /// Returns the new name, or `None` to keep the current one.
    fn ask(&self, current_name: &str) -> Option<String>;
}

pub trait ConfigProvider: Send + Sync {
    fn save_directory(&self) -> &str;
    fn skip_rename_prompt(&self) -> bool;
    fn max_images(&self) -> usize;
    fn filename_prefix(&self) -> &str;
}

#[async_trait]
impl<T: ClipboardCapture + ?Sized> ClipboardCapture for Box<T> {
    fn is_supported(&self) -> bool {
        (**self).is_supported()
    }

    async fn capture(&self) -> Result<NamespacePath> {
        (**self).capture().await
    }
}

#[async_trait]
impl<T: TerminalSink + ?Sized> TerminalSink for Box<T> {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }

    async fn insert_text(&self, text: &str) -> Result<()> {
        (**self).insert_text(text).await
    }
}
