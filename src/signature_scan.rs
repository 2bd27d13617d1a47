//! Walks a process's readable virtual memory looking for a fixed 6-byte
//! code sequence, and reports the remote address of the first match.
//! This address survives ASLR-induced relocation as a stable anchor for
//! the pointer chain in [`crate::pointer_walk`].

use crate::memmap::MemRegions;
use crate::remote_reader::{BufferPool, RemoteReader};

/// 64 KiB scan window. Windows are read with `patternLen - 1` bytes of
/// overlap so a match straddling a window boundary is never missed.
pub const SCAN_CHUNK_SIZE: usize = 64 * 1024;

/// The signature is matched exactly; there is no wildcard mask in the
/// reachable code path.
pub const PATTERN: [u8; 6] = [0xF8, 0x01, 0x74, 0x04, 0x83, 0x65];

pub const SCAN_WINDOW_LEN: usize = SCAN_CHUNK_SIZE + PATTERN.len() - 1;

/// A remote address at which [`PATTERN`] was observed. Valid for the
/// lifetime of the target process incarnation it was found in; the
/// Control Loop discards it on the first failed read through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseAnchor(pub u64);

/// Scans every readable region of `reader`'s target, in order, for the
/// first occurrence of [`PATTERN`]. Returns `None` ("not found") if the
/// pattern is absent from every region, or if the process's memory map
/// can no longer be read at all (it may have exited mid-scan).
pub fn scan(reader: &RemoteReader, pool: &mut BufferPool) -> Option<BaseAnchor> {
    let regions = MemRegions::for_pid(reader.pid()).ok()?;

    for region in regions {
        let mut offset = 0u64;
        while offset < region.len {
            let window_addr = region.start + offset;

            // Regions can race with the target's own allocator; a failed
            // window read is skipped, not fatal to the whole scan.
            if let Some(window) = reader.read_scan_window(window_addr, pool) {
                if let Some(index) = find_pattern(window, &PATTERN) {
                    return Some(BaseAnchor(window_addr + index as u64));
                }
            }

            offset += SCAN_CHUNK_SIZE as u64;
        }
    }

    None
}

fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
