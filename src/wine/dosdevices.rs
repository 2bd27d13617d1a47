//! Drive-letter resolution and on-disk case repair.
//!
//! Wine exposes each drive letter as a symlink under
//! `<prefix>/dosdevices/<letter>:`, usually pointing at `drive_c` for `c:`
//! and at an arbitrary host directory for anything else. Windows paths
//! are case-insensitive; the filesystem backing the prefix on Linux is
//! not, so a path built purely by string substitution can point at a
//! file that exists under a different case than what the registry/config
//! text says. [`repair_case`] walks the path component by component and
//! swaps in whatever case actually exists on disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Converts a Windows-style path (`C:\Games\osu!\`) into the Unix path it
/// denotes inside `prefix`. The drive letter is matched against
/// `<prefix>/dosdevices/<letter>:` case-insensitively by lowercasing it,
/// since Wine always creates these symlinks with a lowercase letter.
///
/// The result is canonicalized: `dosdevices/<letter>:` is itself a
/// symlink (typically to `drive_c`, or to an arbitrary host directory
/// for any other drive), so the raw join must be resolved through it to
/// land on the real directory. If canonicalization fails (the path
/// doesn't exist yet, or a component is broken), the raw join is
/// returned instead and left for [`repair_case`] to work with.
pub fn to_unix_path(prefix: &Path, windows_path: &str) -> Option<PathBuf> {
    let mut chars = windows_path.chars();
    let drive = chars.next()?.to_ascii_lowercase();
    if chars.next() != Some(':') {
        return None;
    }

    let rest = &windows_path[2..];
    let rest_unix = rest.replace('\\', "/");
    let rest_unix = rest_unix.trim_start_matches('/');

    let mut path = prefix.join("dosdevices").join(format!("{}:", drive));
    if !rest_unix.is_empty() {
        path.push(rest_unix);
    }

    Some(fs::canonicalize(&path).unwrap_or(path))
}

/// Walks `path` component by component, substituting the real on-disk
/// name wherever the expected-case component is absent but a case-
/// insensitive match exists. Returns `None` if some component is missing
/// outright (case-insensitively) or a directory along the way can't be
/// listed.
pub fn repair_case(path: &Path) -> Option<PathBuf> {
    let mut current = PathBuf::new();

    for component in path.components() {
        match component {
            Component::RootDir | Component::Prefix(_) => current.push(component.as_os_str()),
            Component::CurDir | Component::ParentDir => current.push(component.as_os_str()),
            Component::Normal(name) => {
                let candidate = current.join(name);
                if candidate.exists() {
                    current = candidate;
                    continue;
                }

                let name_str = name.to_str()?;
                let real_name = find_case_insensitive(&current, name_str)?;
                current.push(real_name);
            }
        }
    }

    Some(current)
}

/// Strips trailing whitespace, `.`, and `/` from a path segment -- Windows
/// silently drops these on creation, so a segment carried over from the
/// registry or config text can have them where the on-disk name doesn't.
fn strip_segment_noise(s: &str) -> &str {
    s.trim_end_matches(|c: char| c.is_whitespace() || c == '.' || c == '/')
}

fn find_case_insensitive(dir: &Path, target: &str) -> Option<std::ffi::OsString> {
    let target = strip_segment_noise(target);
    let entries = fs::read_dir(dir).ok()?;
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str() {
            if strip_segment_noise(name).eq_ignore_ascii_case(target) {
                return Some(file_name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_c_drive_with_trailing_slash() {
        let prefix = Path::new("/home/user/.wine");
        let got = to_unix_path(prefix, "C:\\Games\\osu!\\").unwrap();
        assert_eq!(got, Path::new("/home/user/.wine/dosdevices/c:/Games/osu!"));
    }

    #[test]
    fn maps_other_drive_letters() {
        let prefix = Path::new("/home/user/.wine");
        let got = to_unix_path(prefix, "D:\\Games\\osu!").unwrap();
        assert_eq!(got, Path::new("/home/user/.wine/dosdevices/d:/Games/osu!"));
    }

    #[test]
    fn malformed_path_without_colon_is_none() {
        assert!(to_unix_path(Path::new("/prefix"), "Cfoo").is_none());
    }

    #[test]
    fn canonicalizes_through_symlink_when_full_path_exists() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("wineprefix");
        fs::create_dir_all(prefix.join("dosdevices")).unwrap();

        let real_target = dir.path().join("opt_osu");
        fs::create_dir_all(real_target.join("Games/osu!")).unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(&real_target, prefix.join("dosdevices/c:")).unwrap();

        let got = to_unix_path(&prefix, "C:\\Games\\osu!").unwrap();
        let expected = fs::canonicalize(real_target.join("Games/osu!")).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn repair_case_finds_differently_cased_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Songs")).unwrap();

        let wanted = dir.path().join("songs");
        let repaired = repair_case(&wanted).unwrap();
        assert_eq!(repaired, dir.path().join("Songs"));
    }

    #[test]
    fn repair_case_is_noop_when_case_already_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Songs")).unwrap();

        let wanted = dir.path().join("Songs");
        let repaired = repair_case(&wanted).unwrap();
        assert_eq!(repaired, wanted);
    }

    #[test]
    fn repair_case_returns_none_when_nothing_matches() {
        let dir = tempfile::tempdir().unwrap();
        let wanted = dir.path().join("DoesNotExist");
        assert!(repair_case(&wanted).is_none());
    }

    #[test]
    fn repair_case_tolerates_trailing_whitespace_dropped_by_windows() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Artist - Title")).unwrap();

        let wanted = dir.path().join("Artist - Title ");
        let repaired = repair_case(&wanted).unwrap();
        assert_eq!(repaired, dir.path().join("Artist - Title"));
    }
}
