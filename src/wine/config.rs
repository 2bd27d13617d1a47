//! Reads `osu!.<user>.cfg` for the configured `BeatmapDirectory`.
//!
//! The value on disk is whatever the Windows client last wrote: either an
//! absolute Windows path (its own drive letter, independent of the
//! install drive) or a path relative to the install directory. Both
//! forms are resolved down to a Unix path under the prefix.

use std::fs;
use std::path::{Path, PathBuf};

use super::dosdevices;

/// Returns the beatmap directory configured for `username` inside
/// `install_dir_unix`, or `None` if the config file is missing, unreadable,
/// or has no `BeatmapDirectory` line. Callers are not in a position to
/// guess a songs directory on the caller's behalf -- an unresolved config
/// is left unresolved rather than defaulted to `<install_dir_unix>/Songs`.
pub fn beatmap_directory(prefix: &Path, install_dir_unix: &Path, username: &str) -> Option<PathBuf> {
    resolve_from_config(prefix, install_dir_unix, username)
}

fn resolve_from_config(prefix: &Path, install_dir_unix: &Path, username: &str) -> Option<PathBuf> {
    let cfg_path = install_dir_unix.join(format!("osu!.{}.cfg", username));
    let contents = fs::read_to_string(&cfg_path).ok()?;
    let raw_value = find_beatmap_directory_line(&contents)?;

    let resolved = if is_absolute_windows_path(&raw_value) {
        dosdevices::to_unix_path(prefix, &raw_value)?
    } else {
        let relative_unix = raw_value.replace('\\', "/");
        install_dir_unix.join(relative_unix)
    };

    Some(dosdevices::repair_case(&resolved).unwrap_or(resolved))
}

fn find_beatmap_directory_line(contents: &str) -> Option<String> {
    for line in contents.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("BeatmapDirectory") {
            let rest = rest.trim_start();
            if let Some(value) = rest.strip_prefix('=') {
                return Some(value.trim().to_string());
            }
        }
    }
    None
}

fn is_absolute_windows_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
