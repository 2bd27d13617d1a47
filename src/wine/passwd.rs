//! User identification and home-directory lookup.
//!
//! Reads `/proc/<pid>/loginuid` for the UID, then resolves it against
//! `/etc/passwd` to learn the account name (used to build the
//! `osu!.<name>.cfg` filename in [`super::config`]) and home directory
//! (used for the `~/.wine` fallback when `WINEPREFIX` is unset).

use std::fs;

/// Sentinel `loginuid` value the kernel reports when the process has no
/// login session (e.g. started by a display manager or a container init).
const NO_LOGIN_UID: u32 = 4_294_967_295;

/// Compatibility fallback UID used by the original tool whenever
/// `loginuid` comes back as [`NO_LOGIN_UID`]. Real systems are not
/// guaranteed to be running the target as UID 1000, so this is logged at
/// `warn!` every time it's hit rather than applied silently.
const FALLBACK_UID: u32 = 1000;

/// Reads and parses `/proc/<pid>/loginuid`, substituting [`FALLBACK_UID`]
/// for the "no session" sentinel.
pub fn loginuid(pid: i32) -> Option<u32> {
    let path = format!("/proc/{}/loginuid", pid);
    let raw = fs::read_to_string(&path).ok()?;
    let uid: u32 = raw.trim().parse().ok()?;

    if uid == NO_LOGIN_UID {
        log::warn!(
            "pid {} has no loginuid session; falling back to uid {} for compatibility",
            pid,
            FALLBACK_UID
        );
        Some(FALLBACK_UID)
    } else {
        Some(uid)
    }
}

/// One parsed row of `/etc/passwd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: u32,
    pub home: String,
}

/// Finds the `/etc/passwd` row whose UID matches `uid`.
pub fn find_by_uid(uid: u32) -> Option<PasswdEntry> {
    let contents = fs::read_to_string("/etc/passwd").ok()?;
    parse_passwd(&contents, uid)
}

fn parse_passwd(contents: &str, uid: u32) -> Option<PasswdEntry> {
    for line in contents.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() < 6 {
            continue;
        }
        let row_uid: u32 = match fields[2].parse() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if row_uid == uid {
            return Some(PasswdEntry {
                name: fields[0].to_string(),
                uid: row_uid,
                home: fields[5].to_string(),
            });
        }
    }
    None
}
