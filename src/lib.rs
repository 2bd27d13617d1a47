//! Live external memory inspector for a Wine/Proton-hosted `osu!.exe`.
//!
//! Watches a running instance of the game on a Linux host, locates its
//! in-memory beatmap record via a signature-anchored pointer chain, and
//! resolves the Windows-style path it reports into a real path on disk by
//! walking the hosting Wine prefix's registry and configuration.
//!
//! [`start`] is the crate's single high-level entry point; every
//! component module below is also `pub` for embedders that want to
//! compose their own control loop instead.

mod error;

pub mod control_loop;
pub mod memmap;
pub mod os_bridge;
pub mod pointer_walk;
pub mod process_locator;
pub mod remote_reader;
pub mod signature_scan;
pub mod sink;
pub mod wine;

pub use control_loop::{start, Options, Report};
pub use error::{ObsResult, ObserverError};
