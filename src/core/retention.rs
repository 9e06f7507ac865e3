use crate::domain::model::{is_supported_image_name, CleanupReport, ImageFileRecord};
use std::path::Path;

pub const MAX_RETAINED_IMAGES: usize = 100;

/// 列出目錄中的圖片檔；無法讀取 metadata 的項目直接略過
fn list_images(directory: &Path) -> Vec<ImageFileRecord> {
    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("Cannot list {}: {}", directory.display(), e);
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_str()?.to_string();
            if !is_supported_image_name(&name) {
                return None;
            }
            let metadata = entry.metadata().ok()?;
            if !metadata.is_file() {
                return None;
            }
            let modified = metadata.modified().ok()?;
            Some(ImageFileRecord {
                name,
                path: entry.path(),
                modified,
            })
        })
        .collect()
}

/// Keeps the `max_count` newest images in `directory` and deletes the rest.
///
/// Never fails: an unreadable directory is treated as empty and each failed
/// deletion is logged and counted. Files with equal modification times are
/// ordered by name, larger names first.
pub fn clean(directory: &Path, max_count: usize) -> CleanupReport {
    sweep(directory, max_count, None)
}

/// Like [`clean`], but `protected` always ranks as the newest image and is
/// never deleted, whatever its modification time.
pub fn clean_protecting(directory: &Path, max_count: usize, protected: &Path) -> CleanupReport {
    sweep(directory, max_count, protected.file_name().and_then(|name| name.to_str()))
}

fn sweep(directory: &Path, max_count: usize, protected: Option<&str>) -> CleanupReport {
    let report = prune(list_images(directory), max_count, protected);
    if !report.deleted.is_empty() {
        tracing::info!(
            "🧹 Cleaned up {} old image(s) in {}",
            report.deleted.len(),
            directory.display()
        );
    }
    report
}

fn prune(
    mut images: Vec<ImageFileRecord>,
    max_count: usize,
    protected: Option<&str>,
) -> CleanupReport {
    let max_count = max_count.max(1);
    let mut report = CleanupReport {
        scanned: images.len(),
        ..CleanupReport::default()
    };

    images.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.name.cmp(&a.name)));
    if let Some(idx) = protected.and_then(|name| images.iter().position(|i| i.name == name)) {
        let image = images.remove(idx);
        images.insert(0, image);
    }

    if images.len() <= max_count {
        report.kept = images.len();
        return report;
    }

    report.kept = max_count;
    for image in images.drain(max_count..) {
        match std::fs::remove_file(&image.path) {
            Ok(()) => {
                tracing::debug!("🗑️ Removed old image {}", image.name);
                report.deleted.push(image.path);
            }
            Err(e) => {
                tracing::warn!("Failed to remove old image {}: {}", image.name, e);
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, seconds: i64) {
        let path = dir.join(name);
        std::fs::write(&path, b"img").unwrap();
        set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000 + seconds, 0)).unwrap();
    }

    #[test]
    fn test_clamps_to_at_least_one() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.png", 1);
        touch(temp.path(), "b.png", 2);

        let report = clean(temp.path(), 0);
        assert_eq!(report.kept, 1);
        assert!(temp.path().join("b.png").exists());
        assert!(!temp.path().join("a.png").exists());
    }

    #[test]
    fn test_protected_image_survives_with_old_mtime() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "img_copied.png", 1);
        touch(temp.path(), "a.png", 5);
        touch(temp.path(), "b.png", 6);

        let report = clean_protecting(temp.path(), 2, &temp.path().join("img_copied.png"));

        assert_eq!(report.kept, 2);
        assert_eq!(report.deleted, vec![temp.path().join("a.png")]);
        assert!(temp.path().join("img_copied.png").exists());
        assert!(temp.path().join("b.png").exists());
    }

    #[test]
    fn test_ignores_non_images_and_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "old.png", 1);
        touch(temp.path(), "notes.txt", 0);
        std::fs::create_dir(temp.path().join("folder.png")).unwrap();
        touch(temp.path(), "new.JPG", 2);

        let report = clean(temp.path(), 1);
        assert_eq!(report.scanned, 2);
        assert!(temp.path().join("notes.txt").exists());
        assert!(temp.path().join("folder.png").is_dir());
        assert!(temp.path().join("new.JPG").exists());
        assert!(!temp.path().join("old.png").exists());
    }

    #[test]
    fn test_ties_broken_by_name() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.png", 5);
        touch(temp.path(), "b.png", 5);
        touch(temp.path(), "c.png", 5);

        clean(temp.path(), 2);
        assert!(temp.path().join("c.png").exists());
        assert!(temp.path().join("b.png").exists());
        assert!(!temp.path().join("a.png").exists());
    }

    #[test]
    fn test_vanished_file_does_not_abort_pruning() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "keep.png", 10);
        touch(temp.path(), "old1.png", 1);
        touch(temp.path(), "old2.png", 2);

        let images = list_images(temp.path());
        assert_eq!(images.len(), 3);
        // 模擬其他程序在掃描後刪掉檔案
        std::fs::remove_file(temp.path().join("old2.png")).unwrap();

        let report = prune(images, 1, None);
        assert_eq!(report.failed, 1);
        assert_eq!(report.deleted, vec![temp.path().join("old1.png")]);
        assert!(temp.path().join("keep.png").exists());
    }

    #[test]
    fn test_missing_directory_is_noop() {
        let temp = TempDir::new().unwrap();
        let report = clean(&temp.path().join("missing"), 10);
        assert_eq!(report.scanned, 0);
        assert!(report.deleted.is_empty());
    }
}
