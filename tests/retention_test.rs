use filetime::{set_file_mtime, FileTime};
use img_paste::core::retention::clean;
use std::path::Path;
use tempfile::TempDir;

fn write_image(dir: &Path, name: &str, timestamp: i64) {
    let path = dir.join(name);
    std::fs::write(&path, b"image").unwrap();
    set_file_mtime(&path, FileTime::from_unix_time(1_700_000_000 + timestamp, 0)).unwrap();
}

#[test]
fn test_keeps_ten_newest_of_twelve() {
    let temp = TempDir::new().unwrap();
    for ts in 1..=12 {
        write_image(temp.path(), &format!("img_{:02}.png", ts), ts);
    }

    let report = clean(temp.path(), 10);

    assert_eq!(report.scanned, 12);
    assert_eq!(report.kept, 10);
    assert_eq!(report.deleted.len(), 2);
    assert_eq!(report.failed, 0);
    assert!(!temp.path().join("img_01.png").exists());
    assert!(!temp.path().join("img_02.png").exists());
    for ts in 3..=12 {
        assert!(temp.path().join(format!("img_{:02}.png", ts)).exists());
    }
}

#[test]
fn test_mixed_extensions_and_case() {
    let temp = TempDir::new().unwrap();
    write_image(temp.path(), "a.PNG", 1);
    write_image(temp.path(), "b.jpeg", 2);
    write_image(temp.path(), "c.webp", 3);
    write_image(temp.path(), "d.gif", 4);
    write_image(temp.path(), "readme.md", 0);

    let report = clean(temp.path(), 2);

    assert_eq!(report.scanned, 4);
    assert!(temp.path().join("d.gif").exists());
    assert!(temp.path().join("c.webp").exists());
    assert!(!temp.path().join("b.jpeg").exists());
    assert!(!temp.path().join("a.PNG").exists());
    assert!(temp.path().join("readme.md").exists());
}

#[test]
fn test_directory_without_images_is_noop() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("notes.txt"), b"hello").unwrap();

    let report = clean(temp.path(), 10);

    assert_eq!(report.scanned, 0);
    assert!(report.deleted.is_empty());
    assert!(temp.path().join("notes.txt").exists());
}

#[test]
fn test_under_limit_deletes_nothing() {
    let temp = TempDir::new().unwrap();
    for ts in 1..=3 {
        write_image(temp.path(), &format!("{}.png", ts), ts);
    }

    let report = clean(temp.path(), 10);
    assert_eq!(report.kept, 3);
    assert!(report.deleted.is_empty());
}
