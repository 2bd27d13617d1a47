//! Thin wrappers around the two kernel primitives the rest of this crate
//! depends on: liveness-by-signal and cross-process scatter/gather reads.
//!
//! No other OS facility is used directly by this module. Liveness goes
//! through `rustix` (already a dependency for `/proc` filesystem access
//! elsewhere in the crate); the scatter/gather read has no `rustix`
//! equivalent, so it goes straight to `libc`.

use rustix::process::{test_kill_process, Pid};

/// Sends signal 0 to `pid`. True iff the kernel accepted the delivery,
/// which on Linux means the process exists and is visible to us (it may
/// still be a zombie; `process_locator` treats that as a reason to
/// rediscover, not as a reason to disbelieve this check).
pub fn is_alive(pid: i32) -> bool {
    let pid = match Pid::from_raw(pid) {
        Some(pid) => pid,
        None => return false,
    };
    test_kill_process(pid).is_ok()
}

/// Performs a single `process_vm_readv` scatter/gather read of
/// `local_buf.len()` bytes from `remote_addr` in `pid`'s address space.
///
/// Succeeds only if the kernel reports that the full buffer was copied;
/// any short read or error is a failure with no retry at this layer. The
/// specific errno is not surfaced to callers, who only get `true`/`false`;
/// it's logged here for diagnostics and nothing more.
pub fn read_remote(pid: i32, remote_addr: u64, local_buf: &mut [u8]) -> bool {
    if local_buf.is_empty() {
        return true;
    }

    let local_iov = libc::iovec {
        iov_base: local_buf.as_mut_ptr() as *mut libc::c_void,
        iov_len: local_buf.len(),
    };
    let remote_iov = libc::iovec {
        iov_base: remote_addr as *mut libc::c_void,
        iov_len: local_buf.len(),
    };

    // SAFETY: `local_iov` points at `local_buf`, which outlives this call;
    // `remote_iov` is only ever dereferenced inside the kernel, in the
    // target's address space, never by us. The call copies at most
    // `local_buf.len()` bytes into `local_buf` and touches nothing else in
    // our address space.
    let copied = unsafe { libc::process_vm_readv(pid, &local_iov, 1, &remote_iov, 1, 0) };

    if copied < 0 {
        let errno = io_last_error();
        log::trace!("process_vm_readv({}, {:#x}, {}) failed: {}", pid, remote_addr, local_buf.len(), errno);
        false
    } else {
        copied as usize == local_buf.len()
    }
}

fn io_last_error() -> std::io::Error {
    std::io::Error::last_os_error()
}
