//! Crate-local error type and the macro-based plumbing used to build it.
//!
//! This mirrors the `ProcError`/`IoErrorWrapper` pattern of the procfs
//! crate this tool grew out of: every I/O failure keeps the path that
//! caused it, and a couple of small macros keep call sites free of
//! boilerplate.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Wraps an `io::Error` together with the path that was being operated on,
/// so that `Display`/`Debug` output is actually actionable.
#[derive(Debug)]
pub struct IoErrorWrapper {
    pub path: PathBuf,
    pub inner: io::Error,
}

impl fmt::Display for IoErrorWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.inner)
    }
}

impl std::error::Error for IoErrorWrapper {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}

/// Error kinds that cross a public function boundary as a `Result`.
///
/// Several other failure classifications this tool's components can hit
/// -- a missing target process, a failed signature scan, a bad remote
/// read, an out-of-range decoded string length -- are represented with
/// dedicated, narrower types right at their own component boundary
/// instead of funneling through here: [`crate::process_locator::Status`]
/// for the first two, [`crate::pointer_walk::WalkError`] for the next
/// two. An unresolved songs root is a plain `Option::None` from
/// [`crate::wine::resolve_songs_root`] rather than an error value.
/// `ObserverError` covers what's left: path-carrying I/O failures,
/// surfaced by [`crate::memmap::MemRegions::for_pid`] and
/// [`crate::sink::write_report`].
#[derive(Debug)]
pub enum ObserverError {
    /// Writing the change sink file failed. Never propagated past the
    /// control loop; logged and dropped.
    SinkWrite(IoErrorWrapper),
    /// A filesystem error with no more specific classification.
    Io(IoErrorWrapper),
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverError::SinkWrite(e) => write!(f, "sink write failed: {}", e),
            ObserverError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ObserverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObserverError::SinkWrite(e) | ObserverError::Io(e) => Some(e),
            _ => None,
        }
    }
}

pub type ObsResult<T> = Result<T, ObserverError>;

/// Wraps an `io::Error` in an [`IoErrorWrapper`] carrying `$path`, short-circuiting
/// the enclosing function on failure.
macro_rules! wrap_io_error {
    ($path:expr, $expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => {
                return Err(crate::error::ObserverError::Io(crate::error::IoErrorWrapper {
                    path: ::std::path::PathBuf::from($path),
                    inner: e,
                }))
            }
        }
    };
}

pub(crate) use wrap_io_error;
