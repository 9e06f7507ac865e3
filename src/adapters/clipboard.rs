//! Clipboard capture backends.
//!
//! Both write the captured image into a dedicated temporary directory named
//! `<YYYYmmdd_HHMMSS>_<8 hex>.<ext>` and return its path.

use crate::domain::model::{
    is_supported_image_name, Namespace, NamespacePath, SUPPORTED_IMAGE_EXTENSIONS,
};
use crate::domain::ports::ClipboardCapture;
use crate::utils::error::{PasteError, Result};
use async_trait::async_trait;
use std::path::PathBuf;

pub const CAPTURE_DIR_NAME: &str = "img-paste";

/// 以時間戳加隨機字尾產生暫存檔名，避免同時執行時互相覆蓋
pub fn capture_file_name(extension: &str) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}{}", stamp, &random[..8], extension)
}

pub fn capture_directory() -> PathBuf {
    std::env::temp_dir().join(CAPTURE_DIR_NAME)
}

/// 剪貼簿文字若是圖片檔路徑（或 file:// URI），回傳該檔案
pub fn copied_image_file(text: &str) -> Option<PathBuf> {
    let line = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let raw = line.strip_prefix("file://").unwrap_or(line);
    let raw = raw.trim_matches('"');
    let path = PathBuf::from(raw);
    if is_supported_image_name(raw) && path.is_file() {
        Some(path)
    } else {
        None
    }
}

#[cfg(feature = "native-clipboard")]
fn duplicate_into(directory: &std::path::Path, source: &std::path::Path) -> Result<PathBuf> {
    let name = source.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let extension = crate::core::filename::extension_of(name).unwrap_or_else(|| ".png".to_string());
    let target = directory.join(capture_file_name(&extension));
    std::fs::copy(source, &target).map_err(|e| PasteError::CaptureFailed {
        detail: format!("copying {}: {}", source.display(), e),
    })?;
    Ok(target)
}

/// Native clipboard access through `arboard`, encoding bitmaps as PNG.
///
/// The blocking clipboard call runs on the blocking pool; when the caller's
/// timeout fires the thread is abandoned rather than killed.
#[cfg(feature = "native-clipboard")]
#[derive(Debug, Clone)]
pub struct NativeClipboard {
    directory: PathBuf,
}

#[cfg(feature = "native-clipboard")]
impl NativeClipboard {
    pub fn new() -> Self {
        Self {
            directory: capture_directory(),
        }
    }

    pub fn with_directory(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn capture_blocking(directory: &std::path::Path) -> Result<PathBuf> {
        let mut clipboard = arboard::Clipboard::new().map_err(|e| PasteError::CaptureFailed {
            detail: e.to_string(),
        })?;

        std::fs::create_dir_all(directory).map_err(|e| PasteError::CaptureFailed {
            detail: format!("creating capture directory: {}", e),
        })?;

        match clipboard.get_image() {
            Ok(image) => {
                let width = u32::try_from(image.width).map_err(|_| PasteError::CaptureFailed {
                    detail: "image width out of range".to_string(),
                })?;
                let height = u32::try_from(image.height).map_err(|_| PasteError::CaptureFailed {
                    detail: "image height out of range".to_string(),
                })?;
                let target = directory.join(capture_file_name(".png"));
                image::save_buffer(
                    &target,
                    &image.bytes,
                    width,
                    height,
                    image::ExtendedColorType::Rgba8,
                )
                .map_err(|e| PasteError::CaptureFailed {
                    detail: format!("encoding png: {}", e),
                })?;
                Ok(target)
            }
            Err(arboard::Error::ContentNotAvailable) => {
                // 沒有點陣圖時，檢查是否複製了圖片檔
                let text = clipboard.get_text().unwrap_or_default();
                match copied_image_file(&text) {
                    Some(source) => duplicate_into(directory, &source),
                    None => Err(PasteError::NoImageInClipboard),
                }
            }
            Err(e) => Err(PasteError::CaptureFailed {
                detail: e.to_string(),
            }),
        }
    }
}

#[cfg(feature = "native-clipboard")]
impl Default for NativeClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "native-clipboard")]
#[async_trait]
impl ClipboardCapture for NativeClipboard {
    fn is_supported(&self) -> bool {
        cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux"))
    }

    async fn capture(&self) -> Result<NamespacePath> {
        let directory = self.directory.clone();
        let path = tokio::task::spawn_blocking(move || Self::capture_blocking(&directory))
            .await
            .map_err(|e| PasteError::CaptureFailed {
                detail: format!("capture task failed: {}", e),
            })??;
        Ok(NamespacePath::native(path.to_string_lossy().into_owned()))
    }
}

const NO_IMAGE_MARKER: &str = "NO_IMAGE";

/// Captures the Windows clipboard from inside WSL through `powershell.exe`.
///
/// The child is spawned with `kill_on_drop`, so a caller-side timeout that
/// drops the future also terminates PowerShell.
#[derive(Debug, Clone)]
pub struct WindowsHostClipboard {
    program: String,
}

impl WindowsHostClipboard {
    pub fn new() -> Self {
        Self {
            program: "powershell.exe".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn script() -> String {
        let extensions = SUPPORTED_IMAGE_EXTENSIONS
            .iter()
            .map(|ext| format!("'{}'", ext))
            .collect::<Vec<_>>()
            .join(",");
        format!(
            r#"$ErrorActionPreference = 'Stop'
Add-Type -AssemblyName System.Windows.Forms
Add-Type -AssemblyName System.Drawing
$dir = Join-Path $env:TEMP '{dir}'
New-Item -ItemType Directory -Force -Path $dir | Out-Null
$stamp = Get-Date -Format 'yyyyMMdd_HHmmss'
$rand = [guid]::NewGuid().ToString('N').Substring(0, 8)
$exts = @({exts})
if ([System.Windows.Forms.Clipboard]::ContainsFileDropList()) {{
  foreach ($f in [System.Windows.Forms.Clipboard]::GetFileDropList()) {{
    $ext = [System.IO.Path]::GetExtension($f).ToLower()
    if ($exts -contains $ext) {{
      $out = Join-Path $dir ($stamp + '_' + $rand + $ext)
      Copy-Item -LiteralPath $f -Destination $out
      Write-Output $out
      exit 0
    }}
  }}
}}
if ([System.Windows.Forms.Clipboard]::ContainsImage()) {{
  $img = [System.Windows.Forms.Clipboard]::GetImage()
  $out = Join-Path $dir ($stamp + '_' + $rand + '.png')
  $img.Save($out, [System.Drawing.Imaging.ImageFormat]::Png)
  $img.Dispose()
  Write-Output $out
  exit 0
}}
Write-Output '{marker}'
"#,
            dir = CAPTURE_DIR_NAME,
            exts = extensions,
            marker = NO_IMAGE_MARKER,
        )
    }

    /// 解析 PowerShell 輸出：最後一個非空行為檔案路徑或 NO_IMAGE
    pub fn parse_output(stdout: &str) -> Result<NamespacePath> {
        let last = stdout
            .lines()
            .map(str::trim)
            .rev()
            .find(|line| !line.is_empty())
            .ok_or_else(|| PasteError::CaptureFailed {
                detail: "capture script produced no output".to_string(),
            })?;

        if last == NO_IMAGE_MARKER {
            return Err(PasteError::NoImageInClipboard);
        }
        if Namespace::detect(last) != Namespace::Host {
            return Err(PasteError::CaptureFailed {
                detail: format!("unexpected capture output: {}", last),
            });
        }
        Ok(NamespacePath::host(last))
    }
}

impl Default for WindowsHostClipboard {
    fn default() -> Self {
        Self::new()
    }
}

/// 是否在 WSL 中執行
pub fn is_wsl() -> bool {
    if std::env::var_os("WSL_DISTRO_NAME").is_some() {
        return true;
    }
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|release| release.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

#[async_trait]
impl ClipboardCapture for WindowsHostClipboard {
    fn is_supported(&self) -> bool {
        is_wsl()
    }

    async fn capture(&self) -> Result<NamespacePath> {
        let output = tokio::process::Command::new(&self.program)
            .args(["-NoProfile", "-NonInteractive", "-Command"])
            .arg(Self::script())
            .stdin(std::process::Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| PasteError::CaptureFailed {
                detail: format!("spawning {}: {}", self.program, e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PasteError::CaptureFailed {
                detail: format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            });
        }
        Self::parse_output(&stdout)
    }
}
