pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command, PasteArgs};
pub use config::PasteConfig;

pub use core::ingest::{IngestEngine, IngestFailure, IngestSettings, IngestStage};
pub use domain::model::{Namespace, NamespacePath, SaveLocation};
pub use utils::error::{PasteError, Result};
