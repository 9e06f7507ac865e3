pub mod filename;
pub mod ingest;
pub mod path_translator;
pub mod retention;
pub mod save_directory;

pub use crate::domain::model::{Namespace, NamespacePath, SaveLocation};
pub use crate::domain::ports::{
    ClipboardCapture, ConfigProvider, IgnoreRegistrar, RenamePrompt, TerminalSink,
};
pub use crate::utils::error::Result;
