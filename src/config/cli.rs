use crate::config::toml_config::PasteConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "img-paste")]
#[command(about = "Save the clipboard image and insert an @path reference into the terminal")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Capture the clipboard image and insert its reference (default)
    Paste(PasteArgs),

    /// Delete the oldest images beyond a maximum count
    Clean {
        /// Directory to clean
        #[arg(long)]
        dir: PathBuf,

        /// Number of newest images to keep (1-100)
        #[arg(long, default_value = "10")]
        max: usize,

        /// Print the cleanup report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert a path between host (C:\...) and guest (/mnt/c/...) form
    Translate {
        #[arg(long, conflicts_with = "to_host")]
        to_guest: bool,

        #[arg(long)]
        to_host: bool,

        path: String,
    },

    /// Check whether a file name would be accepted when renaming
    CheckName {
        name: String,

        /// Extension the name must keep
        #[arg(long, default_value = ".png")]
        ext: String,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct PasteArgs {
    /// Override save_directory
    #[arg(long)]
    pub save_dir: Option<String>,

    /// Override max_images
    #[arg(long)]
    pub max_images: Option<usize>,

    /// Override filename_prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Do not ask for a new file name
    #[arg(long)]
    pub skip_rename: bool,

    /// Project root used to anchor a relative save_directory (default: current directory)
    #[arg(long)]
    pub project_root: Option<String>,

    /// Override capture_backend (native | windows-host)
    #[arg(long)]
    pub backend: Option<String>,

    /// Override terminal (stdout | tmux)
    #[arg(long)]
    pub terminal: Option<String>,

    /// Override tmux_target
    #[arg(long)]
    pub tmux_target: Option<String>,
}

impl PasteArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply_overrides(&self, config: &mut PasteConfig) {
        if let Some(dir) = &self.save_dir {
            config.save_directory = dir.clone();
        }
        if let Some(max) = self.max_images {
            config.max_images = max;
        }
        if let Some(prefix) = &self.prefix {
            config.filename_prefix = prefix.clone();
        }
        if self.skip_rename {
            config.skip_rename_prompt = true;
        }
        if let Some(backend) = &self.backend {
            config.capture_backend = backend.clone();
        }
        if let Some(terminal) = &self.terminal {
            config.terminal = terminal.clone();
        }
        if let Some(target) = &self.tmux_target {
            config.tmux_target = Some(target.clone());
        }
    }
}
