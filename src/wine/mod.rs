//! Wine prefix discovery and songs-root resolution.
//!
//! Ties the four submodules together into the one entry point the
//! control loop needs: given a target PID, find the directory the osu!
//! client under Wine is configured to load beatmaps from.

pub mod config;
pub mod dosdevices;
pub mod passwd;
pub mod registry;

use std::fs;
use std::path::{Path, PathBuf};

use passwd::PasswdEntry;

/// Resolves the Songs directory for the osu! process running as `pid`.
///
/// Walks, in order: `WINEPREFIX` (or the `~/.wine` fallback) -> the
/// registry hives for the game's install path -> `dosdevices` to turn
/// that into a Unix path -> the user's `.cfg` for `BeatmapDirectory`.
/// Returns `None` if any step fails to produce something usable; the
/// control loop treats that the same as "target not ready yet".
pub fn resolve_songs_root(pid: i32) -> Option<PathBuf> {
    let (prefix, user) = resolve_prefix(pid)?;

    let install_path_win = registry::extract_install_path(&prefix)?;
    let install_dir_unix = dosdevices::to_unix_path(&prefix, &install_path_win)?;
    let install_dir_unix = dosdevices::repair_case(&install_dir_unix).unwrap_or(install_dir_unix);

    config::beatmap_directory(&prefix, &install_dir_unix, &user.name)
}

/// Determines the Wine prefix and owning account for `pid`.
fn resolve_prefix(pid: i32) -> Option<(PathBuf, PasswdEntry)> {
    let uid = passwd::loginuid(pid)?;
    let user = passwd::find_by_uid(uid)?;

    let prefix = find_wineprefix_env(pid).unwrap_or_else(|| Path::new(&user.home).join(".wine"));

    Some((prefix, user))
}

/// Reads `/proc/<pid>/environ` (a NUL-separated `KEY=VALUE` list) looking
/// for `WINEPREFIX`.
fn find_wineprefix_env(pid: i32) -> Option<PathBuf> {
    let path = format!("/proc/{}/environ", pid);
    let data = fs::read(&path).ok()?;
    parse_wineprefix_env(&data)
}

fn parse_wineprefix_env(data: &[u8]) -> Option<PathBuf> {
    for entry in data.split(|&b| b == 0) {
        if entry.is_empty() {
            continue;
        }
        // One non-UTF-8 entry elsewhere in the block must not hide a later,
        // valid WINEPREFIX entry.
        let text = match std::str::from_utf8(entry) {
            Ok(t) => t,
            Err(_) => continue,
        };
        if let Some(value) = text.strip_prefix("WINEPREFIX=") {
            return Some(PathBuf::from(value));
        }
    }
    None
}
