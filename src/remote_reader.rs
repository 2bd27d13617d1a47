//! A reusable scratch-buffer pool plus typed helpers layered over
//! [`crate::os_bridge::read_remote`].
//!
//! Three classes of buffer are needed per tick: 4-byte pointer reads,
//! `ScanChunkSize + patternLen - 1`-byte scan windows, and up-to-512-byte
//! UTF-16 string payloads. All three are allocated once and reused; every
//! accessor hands back a borrow into the pool, so release on every exit
//! path (including the error paths of the reader itself) falls out of
//! ordinary Rust borrow scoping rather than manual bookkeeping.

use crate::os_bridge;

/// `RemoteString` payloads are rejected above this many UTF-16 code
/// units.
pub const MAX_STRING_CHARS: usize = 256;
const MAX_STRING_BYTES: usize = MAX_STRING_CHARS * 2;

pub struct BufferPool {
    pointer_buf: [u8; 4],
    scan_buf: Vec<u8>,
    string_buf: Vec<u8>,
}

impl BufferPool {
    /// `scan_window_len` should be `ScanChunkSize + patternLen - 1`; it is
    /// allocated once here and reused for every window of every region
    /// for the lifetime of the pool.
    pub fn new(scan_window_len: usize) -> BufferPool {
        BufferPool {
            pointer_buf: [0u8; 4],
            scan_buf: vec![0u8; scan_window_len],
            string_buf: vec![0u8; MAX_STRING_BYTES],
        }
    }
}

/// Binds a target PID to [`os_bridge::read_remote`], adding typed
/// convenience readers on top of the raw byte-buffer primitive.
#[derive(Debug, Clone, Copy)]
pub struct RemoteReader {
    pid: i32,
}

impl RemoteReader {
    pub fn new(pid: i32) -> RemoteReader {
        RemoteReader { pid }
    }

    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// Raw passthrough: fills `buf` entirely or fails. No retry.
    pub fn read_bytes(&self, addr: u64, buf: &mut [u8]) -> bool {
        os_bridge::read_remote(self.pid, addr, buf)
    }

    /// Reads a little-endian `u32` using the pool's 4-byte scratch buffer.
    pub fn read_u32(&self, addr: u64, pool: &mut BufferPool) -> Option<u32> {
        if !self.read_bytes(addr, &mut pool.pointer_buf) {
            return None;
        }
        Some(u32::from_le_bytes(pool.pointer_buf))
    }

    /// Reads a little-endian `i32`. Used for the signed pointer-chain
    /// decode at the top of the pointer walk.
    pub fn read_i32(&self, addr: u64, pool: &mut BufferPool) -> Option<i32> {
        self.read_u32(addr, pool).map(|v| v as i32)
    }

    /// Reads one scan window into the pool's scan buffer and returns a
    /// borrow of it. The window length is fixed at pool-construction time.
    pub fn read_scan_window<'a>(&self, addr: u64, pool: &'a mut BufferPool) -> Option<&'a [u8]> {
        let len = pool.scan_buf.len();
        if !self.read_bytes(addr, &mut pool.scan_buf) {
            return None;
        }
        Some(&pool.scan_buf[..len])
    }

    /// Reads exactly `len_bytes` of string payload into the pool's string
    /// buffer. Returns `None` if the request exceeds the pool's capacity
    /// (which is sized for the 256-character cap) or the read fails.
    pub fn read_string_bytes<'a>(&self, addr: u64, len_bytes: usize, pool: &'a mut BufferPool) -> Option<&'a [u8]> {
        if len_bytes > pool.string_buf.len() {
            return None;
        }
        if !self.read_bytes(addr, &mut pool.string_buf[..len_bytes]) {
            return None;
        }
        Some(&pool.string_buf[..len_bytes])
    }
}
