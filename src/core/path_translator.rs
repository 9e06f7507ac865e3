//! Host (`C:\...`) <-> guest (`/mnt/c/...`) path mapping.
//!
//! Only drive-rooted host paths with an uppercase letter and `/mnt/<lowercase>/`
//! guest paths round trip. Anything else is passed through with separators
//! swapped.

use crate::domain::model::has_drive_prefix;

const MOUNT_ROOT: &str = "/mnt/";

pub fn to_guest(host_path: &str) -> String {
    let unified = host_path.replace('\\', "/");
    if has_drive_prefix(&unified) {
        let letter = unified.as_bytes()[0].to_ascii_lowercase() as char;
        format!("{}{}{}", MOUNT_ROOT, letter, &unified[2..])
    } else {
        unified
    }
}

pub fn to_host(guest_path: &str) -> String {
    match split_mount_drive(guest_path) {
        Some((letter, rest)) => {
            let rest = if rest.is_empty() { "/" } else { rest };
            format!("{}:{}", letter.to_ascii_uppercase(), rest.replace('/', "\\"))
        }
        None => guest_path.replace('/', "\\"),
    }
}

/// `/mnt/c/rest` -> `('c', "/rest")`, `/mnt/c` -> `('c', "")`
fn split_mount_drive(path: &str) -> Option<(char, &str)> {
    let tail = path.strip_prefix(MOUNT_ROOT)?;
    let mut chars = tail.chars();
    let letter = chars.next().filter(|c| c.is_ascii_alphabetic())?;
    let rest = chars.as_str();
    if rest.is_empty() || rest.starts_with('/') {
        Some((letter, rest))
    } else {
        None
    }
}
