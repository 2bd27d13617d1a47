//! Extracts the game's Windows install path from a Wine prefix's registry
//! hives.
//!
//! Deliberately not a full INI/registry parser -- a two-phase line scan
//! (look for one of the trigger subkeys, then scan forward for the
//! `osu!.exe` command value) matches the registry layout Wine actually
//! produces and is far simpler than modeling the format in general.
//! `str::lines()` already tolerates both CRLF and LF hives.

use std::fs;
use std::path::Path;

const TRIGGER_SUBKEYS: [&str; 2] = [r"osu\shell\open\command", r"osustable.file.osz\shell\open\command"];
const EXE_MARKER: &str = "osu!.exe";

/// Searches `system.reg` then `user.reg` inside `prefix`, in that order,
/// and returns the first install path found by either.
pub fn extract_install_path(prefix: &Path) -> Option<String> {
    for filename in ["system.reg", "user.reg"] {
        let path = prefix.join(filename);
        if let Some(found) = scan_registry_file(&path) {
            return Some(found);
        }
    }
    None
}

fn scan_registry_file(path: &Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = contents.lines().collect();

    let mut i = 0;
    while i < lines.len() {
        let lower = lines[i].to_lowercase();
        if TRIGGER_SUBKEYS.iter().any(|subkey| lower.contains(subkey)) {
            let mut j = i + 1;
            while j < lines.len() {
                let line = lines[j];
                // A new registry key block means this subkey's value
                // lines are exhausted without a match.
                if line.trim_start().starts_with('[') {
                    break;
                }
                if let Some(path) = extract_from_value_line(line) {
                    return Some(path);
                }
                j += 1;
            }
            i = j;
        } else {
            i += 1;
        }
    }

    None
}

/// Finds `osu!.exe` on the line, truncates before it, then finds the
/// drive letter by locating the last `:\` before the truncation point.
fn extract_from_value_line(line: &str) -> Option<String> {
    let exe_pos = line.find(EXE_MARKER)?;
    let truncated = &line[..exe_pos];
    let colon_pos = truncated.rfind(":\\")?;
    if colon_pos == 0 {
        // No room for a drive letter before the colon.
        return None;
    }
    Some(truncated[colon_pos - 1..].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn extracts_install_path_from_system_reg_snippet() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("system.reg")).unwrap();
        writeln!(f, "[Software\\\\Classes\\\\osu\\\\shell\\\\open\\\\command]").unwrap();
        writeln!(f, "@=\"\\\"C:\\\\\\\\Games\\\\\\\\osu!\\\\\\\\osu!.exe\\\" \\\"%1\\\"\"").unwrap();
        drop(f);

        let found = extract_install_path(dir.path()).expect("should find install path");
        assert!(found.starts_with("C:\\"));
        assert!(found.ends_with('\\'));
    }

    #[test]
    fn falls_back_to_user_reg_when_system_reg_has_no_match() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("system.reg"), "[Some\\Other\\Key]\n@=\"nope\"\n").unwrap();
        let mut f = fs::File::create(dir.path().join("user.reg")).unwrap();
        writeln!(f, "[Software\\\\Classes\\\\osustable.File.osz\\\\shell\\\\open\\\\command]").unwrap();
        writeln!(f, "@=\"D:\\\\Games\\\\osu!\\\\osu!.exe \\\"%1\\\"\"").unwrap();
        drop(f);

        let found = extract_install_path(dir.path()).expect("should find install path in user.reg");
        assert!(found.starts_with("D:\\"));
    }

    #[test]
    fn key_without_matching_value_line_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut f = fs::File::create(dir.path().join("system.reg")).unwrap();
        writeln!(f, "[Software\\\\Classes\\\\osu\\\\shell\\\\open\\\\command]").unwrap();
        writeln!(f, "@=\"no exe reference here\"").unwrap();
        writeln!(f, "[Next\\\\Key]").unwrap();
        drop(f);
        fs::write(dir.path().join("user.reg"), "").unwrap();

        assert!(extract_install_path(dir.path()).is_none());
    }

    #[test]
    fn extract_from_value_line_requires_room_for_drive_letter() {
        assert!(extract_from_value_line(":\\osu!.exe").is_none());
    }
}
