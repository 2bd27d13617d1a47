//! Dereferences the fixed pointer chain from a [`BaseAnchor`] down to the
//! beatmap record's folder/file strings.
//!
//! All pointer values are unsigned 32-bit addresses in the *remote*
//! process's (32-bit) address space. They are widened to `u64` by
//! zero-extension, never sign-extension -- naive signed decoding would
//! corrupt any remote address above 2 GiB.

use crate::remote_reader::{BufferPool, RemoteReader};
use crate::signature_scan::BaseAnchor;

const BASE_ANCHOR_BACKOFFSET: u64 = 0x0C;
const FOLDER_PTR_OFFSET: u64 = 0x78;
const FILE_PTR_OFFSET: u64 = 0x90;
const LEN_OFFSET: u64 = 0x04;
const PAYLOAD_OFFSET: u64 = 0x08;

const MAX_STRING_CHARS: i32 = 256;

/// Why the pointer chain could not be walked to completion. The Control
/// Loop's reaction only depends on which variant this is, never on any
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkError {
    /// A read failed, or a dereferenced pointer was null, anywhere along
    /// the chain. The Control Loop's reaction is to discard the
    /// `BaseAnchor` and rescan.
    PointerInvalid,
    /// A decoded folder/file length was `<= 0` or `> 256`.
    StringInvalid,
}

fn addr_of(ptr: u32) -> u64 {
    ptr as u64
}

/// Performs the full dereference chain and returns `folder + "/" + file`,
/// with every `\` normalized to `/`.
pub fn walk(reader: &RemoteReader, pool: &mut BufferPool, anchor: BaseAnchor) -> Result<String, WalkError> {
    let p1_addr = anchor.0.wrapping_sub(BASE_ANCHOR_BACKOFFSET);
    let p1 = reader.read_u32(p1_addr, pool).ok_or(WalkError::PointerInvalid)?;
    if p1 == 0 {
        return Err(WalkError::PointerInvalid);
    }

    let p2 = reader.read_u32(addr_of(p1), pool).ok_or(WalkError::PointerInvalid)?;
    if p2 == 0 {
        return Err(WalkError::PointerInvalid);
    }

    let folder_ptr = reader.read_u32(addr_of(p2) + FOLDER_PTR_OFFSET, pool).ok_or(WalkError::PointerInvalid)?;
    let file_ptr = reader.read_u32(addr_of(p2) + FILE_PTR_OFFSET, pool).ok_or(WalkError::PointerInvalid)?;

    let folder = read_remote_string(reader, pool, folder_ptr)?;
    let file = read_remote_string(reader, pool, file_ptr)?;

    let combined = format!("{}/{}", folder, file);
    Ok(combined.replace('\\', "/"))
}

/// Reads one `RemoteString`: a 4-byte LE character count at `P + 4`
/// followed by `count * 2` bytes of UTF-16LE payload at `P + 8`.
fn read_remote_string(reader: &RemoteReader, pool: &mut BufferPool, ptr: u32) -> Result<String, WalkError> {
    let len = reader.read_i32(addr_of(ptr) + LEN_OFFSET, pool).ok_or(WalkError::PointerInvalid)?;

    if len <= 0 || len > MAX_STRING_CHARS {
        return Err(WalkError::StringInvalid);
    }

    let byte_len = (len as usize) * 2;
    let payload_addr = addr_of(ptr) + PAYLOAD_OFFSET;
    let bytes = reader
        .read_string_bytes(payload_addr, byte_len, pool)
        .ok_or(WalkError::PointerInvalid)?;

    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_le_bytes([c[0], c[1]])).collect();

    String::from_utf16(&units).map_err(|_| WalkError::StringInvalid)
}
