//! Process discovery and liveness tracking.
//!
//! Enumerates `/proc` by hand rather than pulling in a process-listing
//! crate: the only information needed per candidate is its `comm` file, so
//! a directory scan plus one small file read per entry is all this
//! module does.

use std::fs;
use std::io::Read;

use crate::os_bridge;

const TARGET_COMM: &str = "osu!.exe";

/// Liveness/discovery status for the current tick, mutated in place by
/// [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Unknown,
    DiscoveredThisTick,
    StillAlive,
    Missing,
}

/// Short-lived per-tick handle owned exclusively by the Control Loop.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext {
    pub pid: i32,
    pub status: Status,
}

impl ScanContext {
    pub fn new() -> ScanContext {
        ScanContext { pid: 0, status: Status::Unknown }
    }

    /// Invalidates the cached PID, forcing a fresh enumeration on the next
    /// [`locate`] call. Used whenever a read through `BaseAnchor` fails or
    /// the process otherwise disappears.
    pub fn invalidate(&mut self) {
        self.pid = 0;
        self.status = Status::Unknown;
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        ScanContext::new()
    }
}

/// Reuses the cached PID if it is still alive, otherwise rescans `/proc`
/// for a process whose `comm` matches [`TARGET_COMM`].
pub fn locate(ctx: &mut ScanContext) {
    if ctx.pid != 0 && os_bridge::is_alive(ctx.pid) {
        ctx.status = Status::StillAlive;
        return;
    }

    match find_target_pid() {
        Some(pid) => {
            ctx.pid = pid;
            ctx.status = Status::DiscoveredThisTick;
        }
        None => {
            ctx.pid = 0;
            ctx.status = Status::Missing;
        }
    }
}

fn find_target_pid() -> Option<i32> {
    let entries = fs::read_dir("/proc").ok()?;

    for entry in entries {
        // Processes vanish mid-scan; a transient read error on one entry
        // must not abort the whole enumeration.
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };

        let name = entry.file_name();
        let name = match name.to_str() {
            Some(n) => n,
            None => continue,
        };

        let pid: i32 = match name.parse() {
            Ok(n) if n > 0 => n,
            _ => continue,
        };

        if comm_matches(pid) {
            return Some(pid);
        }
    }

    None
}

fn comm_matches(pid: i32) -> bool {
    let mut buf = String::new();
    let path = format!("/proc/{}/comm", pid);
    let mut file = match fs::File::open(&path) {
        Ok(f) => f,
        Err(_) => return false,
    };
    if file.read_to_string(&mut buf).is_err() {
        return false;
    }
    buf.trim_end() == TARGET_COMM
}
