//! Lazy parsing of `/proc/<pid>/maps` into readable `[start, start+len)`
//! regions.
//!
//! Read a line, split on whitespace runs, parse the fields we need, and
//! tolerate lines we don't understand by skipping them rather than
//! failing the whole enumeration.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use crate::error::{wrap_io_error, ObsResult};

/// A half-open `[start, start + len)` interval in the remote process's
/// address space. Only regions whose `perms` field contained `r` ever
/// reach this type -- unreadable regions are filtered out during
/// enumeration and never allocated a `MemRegion` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemRegion {
    pub start: u64,
    pub len: u64,
}

impl MemRegion {
    pub fn end(&self) -> u64 {
        self.start + self.len
    }
}

/// A lazy, finite iterator over the readable regions of `/proc/<pid>/maps`.
/// No region is buffered beyond its own `(start, len)` pair.
pub struct MemRegions {
    lines: Lines<BufReader<File>>,
}

impl MemRegions {
    pub fn for_pid(pid: i32) -> ObsResult<MemRegions> {
        let path = format!("/proc/{}/maps", pid);
        let file = wrap_io_error!(&path, File::open(&path));
        Ok(MemRegions {
            lines: BufReader::new(file).lines(),
        })
    }
}

impl Iterator for MemRegions {
    type Item = MemRegion;

    fn next(&mut self) -> Option<MemRegion> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(_) => return None,
            };

            if let Some(region) = parse_maps_line(&line) {
                return Some(region);
            }
            // Unparseable or non-readable line: skip and keep scanning.
        }
    }
}

/// Parses one `/proc/<pid>/maps` line. Returns `None` if the address range
/// doesn't parse, or if the permissions field lacks `r`.
fn parse_maps_line(line: &str) -> Option<MemRegion> {
    let mut fields = line.split_whitespace();
    let range = fields.next()?;
    let perms = fields.next()?;

    if !perms.starts_with('r') {
        return None;
    }

    let (start_s, end_s) = range.split_once('-')?;
    let start = u64::from_str_radix(start_s, 16).ok()?;
    let end = u64::from_str_radix(end_s, 16).ok()?;
    if end < start {
        return None;
    }

    Some(MemRegion { start, len: end - start })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readable_region_parses() {
        let line = "00400000-00500000 r-xp 00000000 08:01 123456 /usr/bin/osu!.exe";
        let region = parse_maps_line(line).expect("should parse");
        assert_eq!(region.start, 0x0040_0000);
        assert_eq!(region.len, 0x0010_0000);
    }

    #[test]
    fn unreadable_region_is_dropped() {
        let line = "7f0000000000-7f0000001000 ---p 00000000 00:00 0";
        assert!(parse_maps_line(line).is_none());
    }

    #[test]
    fn garbage_range_is_dropped() {
        let line = "not-a-range rwxp 00000000 00:00 0";
        assert!(parse_maps_line(line).is_none());
    }

    #[test]
    fn enumerates_self_maps() {
        let regions: Vec<_> = MemRegions::for_pid(std::process::id() as i32).unwrap().collect();
        assert!(!regions.is_empty());
        assert!(regions.iter().all(|r| r.len > 0));
    }
}
