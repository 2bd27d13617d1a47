//! Optional file writer that reflects the current combined beatmap path.
//!
//! Writes to a temp sibling and renames over the target rather than
//! writing in place: `rename(2)` on the same filesystem is atomic, so a
//! reader can never observe a partially written file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{IoErrorWrapper, ObsResult, ObserverError};

/// Writes `"0 <absolute_path>"` (no trailing newline) to `file_path`,
/// replacing any prior content. Failures are the caller's to log; this
/// function does not swallow them -- the control loop logs and drops
/// them at its own call site, which keeps this function testable on
/// its own.
pub fn write_report(file_path: &Path, absolute_path: &str) -> ObsResult<()> {
    let tmp_path = sibling_tmp_path(file_path);
    write_and_rename(file_path, &tmp_path, absolute_path).map_err(|(path, inner)| {
        ObserverError::SinkWrite(IoErrorWrapper { path, inner })
    })
}

fn write_and_rename(file_path: &Path, tmp_path: &Path, absolute_path: &str) -> Result<(), (PathBuf, std::io::Error)> {
    let mut tmp = fs::File::create(tmp_path).map_err(|e| (tmp_path.to_path_buf(), e))?;
    tmp.write_all(format!("0 {}", absolute_path).as_bytes()).map_err(|e| (tmp_path.to_path_buf(), e))?;
    drop(tmp);
    fs::rename(tmp_path, file_path).map_err(|e| (file_path.to_path_buf(), e))
}

fn sibling_tmp_path(file_path: &Path) -> std::path::PathBuf {
    let mut name = file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "osu_path".into());
    name.push(".tmp");
    match file_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => std::path::PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_expected_line_with_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osu_path");

        write_report(&path, "/home/user/Songs/map.osu").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0 /home/user/Songs/map.osu");
    }

    #[test]
    fn overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osu_path");
        fs::write(&path, "stale content that is much longer than the new line").unwrap();

        write_report(&path, "/a/b").unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "0 /a/b");
    }

    #[test]
    fn write_is_atomic_via_temp_then_rename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("osu_path");

        write_report(&path, "/x/y").unwrap();

        // The temp sibling must not linger after a successful write.
        assert!(!dir.path().join("osu_path.tmp").exists());
    }

    #[test]
    fn fails_when_parent_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_subdir").join("osu_path");
        assert!(write_report(&path, "/a/b").is_err());
    }
}
