use crate::core::filename::extension_of;
use crate::core::retention::{self, MAX_RETAINED_IMAGES};
use crate::core::save_directory::SaveDirectoryResolver;
use crate::core::{ClipboardCapture, ConfigProvider, IgnoreRegistrar, RenamePrompt, TerminalSink};
use crate::domain::model::{FinalizedFilename, IngestReport, Namespace, SaveLocation};
use crate::utils::error::{FilenameRejection, PasteError, RelocationCause, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// 單次貼上流程所需的設定
#[derive(Debug, Clone)]
pub struct IngestSettings {
    pub save_directory: String,
    pub skip_rename_prompt: bool,
    pub max_images: usize,
    pub filename_prefix: String,
    pub project_root: Option<String>,
    pub home: Option<String>,
    pub target: Namespace,
    pub capture_timeout: Duration,
}

impl IngestSettings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            save_directory: config.save_directory().to_string(),
            skip_rename_prompt: config.skip_rename_prompt(),
            max_images: config.max_images(),
            filename_prefix: config.filename_prefix().to_string(),
            project_root: None,
            home: None,
            target: Namespace::native(),
            capture_timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }
}

/// 流程階段：Idle → Capturing → Relocating → Renaming → CleaningUp → Emitting → Done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Idle,
    Capturing,
    Relocating,
    Renaming,
    CleaningUp,
    Emitting,
    Done,
}

/// The single failure of an ingest run and the stage it happened in.
#[derive(Debug)]
pub struct IngestFailure {
    pub stage: IngestStage,
    pub error: PasteError,
}

impl fmt::Display for IngestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (stage: {:?})", self.error, self.stage)
    }
}

impl std::error::Error for IngestFailure {}

pub struct IngestEngine<C: ClipboardCapture, T: TerminalSink> {
    capture: C,
    terminal: T,
    registrar: Box<dyn IgnoreRegistrar>,
    prompt: Box<dyn RenamePrompt>,
    settings: IngestSettings,
}

impl<C: ClipboardCapture, T: TerminalSink> IngestEngine<C, T> {
    pub fn new(
        capture: C,
        terminal: T,
        registrar: Box<dyn IgnoreRegistrar>,
        prompt: Box<dyn RenamePrompt>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            capture,
            terminal,
            registrar,
            prompt,
            settings,
        }
    }

    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Runs the whole flow. The first failing step ends the run; files
    /// produced by earlier steps stay where they are.
    pub async fn run(&self) -> std::result::Result<IngestReport, IngestFailure> {
        let mut stage = IngestStage::Idle;
        match self.run_steps(&mut stage).await {
            Ok(report) => Ok(report),
            Err(error) => {
                tracing::debug!("Image paste failed at {:?}: {}", stage, error);
                Err(IngestFailure { stage, error })
            }
        }
    }

    async fn run_steps(&self, stage: &mut IngestStage) -> Result<IngestReport> {
        self.preflight()?;

        *stage = IngestStage::Capturing;
        tracing::debug!("📋 Capturing clipboard image...");
        let captured = self.capture_with_timeout().await?;
        let captured = captured.into_namespace(self.settings.target);
        let source = captured.to_path_buf();
        tracing::debug!("Captured image at {}", source.display());

        *stage = IngestStage::Relocating;
        let resolver = SaveDirectoryResolver::new(&*self.registrar);
        let location = resolver.resolve(
            &self.settings.save_directory,
            self.settings.project_root.as_deref(),
            self.settings.target,
            self.settings.home.as_deref(),
        )?;
        let directory = match location {
            SaveLocation::Directory(directory) => directory,
            SaveLocation::TempArea => source
                .parent()
                .map(Path::to_path_buf)
                .ok_or(PasteError::FileRelocationFailed {
                    cause: RelocationCause::NotFound,
                })?,
        };
        let relocated = relocate(&source, &directory, &self.settings.filename_prefix)?;
        tracing::info!("💾 Saved image to {}", relocated.display());

        *stage = IngestStage::Renaming;
        let final_path = self.rename(relocated)?;

        *stage = IngestStage::CleaningUp;
        let max_images = self.settings.max_images.min(MAX_RETAINED_IMAGES);
        let cleanup = retention::clean_protecting(&directory, max_images, &final_path);

        *stage = IngestStage::Emitting;
        let reference = format!("@{}", final_path.display());
        self.terminal.insert_text(&reference).await?;

        *stage = IngestStage::Done;
        tracing::info!("✅ Inserted {}", reference);
        Ok(IngestReport {
            final_path,
            reference,
            deleted_old_images: cleanup.deleted.len(),
        })
    }

    // 任何檔案系統變動之前的檢查
    fn preflight(&self) -> Result<()> {
        if !self.capture.is_supported() {
            return Err(PasteError::PlatformUnsupported);
        }
        if !self.terminal.is_active() {
            return Err(PasteError::NoActiveTerminal);
        }
        crate::core::filename::validate_prefix(&self.settings.filename_prefix)
    }

    async fn capture_with_timeout(&self) -> Result<crate::domain::model::NamespacePath> {
        let limit = self.settings.capture_timeout;
        match tokio::time::timeout(limit, self.capture.capture()).await {
            Ok(result) => result,
            Err(_) => Err(PasteError::CaptureTimedOut {
                seconds: limit.as_secs(),
            }),
        }
    }

    fn rename(&self, current: PathBuf) -> Result<PathBuf> {
        if self.settings.skip_rename_prompt {
            return Ok(current);
        }

        let current_name = match current.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => return Ok(current),
        };
        let answer = match self.prompt.ask(&current_name) {
            Some(answer) if answer != current_name => answer,
            _ => return Ok(current),
        };

        let expected = extension_of(&current_name).unwrap_or_else(|| ".png".to_string());
        let finalized = FinalizedFilename::new(&answer, &expected)?;
        let target = current.with_file_name(finalized.as_str());
        if target.exists() {
            return Err(PasteError::InvalidFilename(FilenameRejection::AlreadyExists));
        }

        std::fs::rename(&current, &target).map_err(relocation_error)?;
        tracing::info!("✏️ Renamed image to {}", finalized);
        Ok(target)
    }
}

fn relocation_error(error: std::io::Error) -> PasteError {
    tracing::debug!("File operation failed: {}", error);
    PasteError::FileRelocationFailed {
        cause: RelocationCause::from_io(&error),
    }
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `name.png` -> `name_1.png`, `name_2.png`, ... until unused
fn unique_target(directory: &Path, file_name: &str) -> PathBuf {
    let candidate = directory.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let (stem, extension) = match file_name.rfind('.') {
        Some(idx) if idx > 0 => file_name.split_at(idx),
        _ => (file_name, ""),
    };
    (1..)
        .map(|n| directory.join(format!("{}_{}{}", stem, n, extension)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Moves a captured image into `directory` as `<prefix><file name>`.
///
/// Within one directory this is a rename. Across directories the file is
/// copied and the source removed afterwards; if that removal fails both copies
/// are left behind.
pub fn relocate(source: &Path, directory: &Path, prefix: &str) -> Result<PathBuf> {
    let name = source
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(PasteError::FileRelocationFailed {
            cause: RelocationCause::NotFound,
        })?;
    let file_name = format!("{}{}", prefix, name);

    let in_place = source
        .parent()
        .is_some_and(|parent| same_directory(parent, directory));

    if in_place {
        if file_name == name {
            return Ok(source.to_path_buf());
        }
        let target = unique_target(directory, &file_name);
        std::fs::rename(source, &target).map_err(relocation_error)?;
        return Ok(target);
    }

    let target = unique_target(directory, &file_name);
    std::fs::copy(source, &target).map_err(relocation_error)?;
    if let Err(e) = std::fs::remove_file(source) {
        tracing::warn!(
            "Copied image but could not remove the original {}: {}",
            source.display(),
            e
        );
    }
    Ok(target)
}
