//! Top-level state machine that sequences discovery, signature scanning,
//! pointer walking, and path resolution into a single polling loop, and
//! the crate's public entry point.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::os_bridge;
use crate::pointer_walk::{self, WalkError};
use crate::process_locator::{self, ScanContext, Status};
use crate::remote_reader::{BufferPool, RemoteReader};
use crate::signature_scan::{self, BaseAnchor, SCAN_WINDOW_LEN};
use crate::sink;
use crate::wine;

const TICK_NO_TARGET: Duration = Duration::from_millis(300);
const TICK_ACTIVE: Duration = Duration::from_millis(500);
const TICK_SCAN_BACKOFF: Duration = Duration::from_secs(3);

/// Configuration for [`start`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Stop the loop after the first successful emit, returning it.
    pub run_once: bool,
    /// Mirror every change to `file_path` via [`crate::sink`].
    pub write_to_file: bool,
    /// Destination for the change sink, when `write_to_file` is set.
    pub file_path: PathBuf,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            run_once: false,
            write_to_file: false,
            file_path: PathBuf::from("/tmp/osu_path"),
        }
    }
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    pub fn with_run_once(mut self, run_once: bool) -> Options {
        self.run_once = run_once;
        self
    }

    pub fn with_write_to_file(mut self, write_to_file: bool) -> Options {
        self.write_to_file = write_to_file;
        self
    }

    pub fn with_file_path<P: Into<PathBuf>>(mut self, file_path: P) -> Options {
        self.file_path = file_path.into();
        self
    }
}

/// A fully resolved `{ songs_root, relative_path }` pair, plus the
/// combined absolute path used for the sink and for [`start`]'s return
/// value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub songs_root: Option<PathBuf>,
    pub relative_path: String,
}

impl Report {
    /// `songs_root` joined with `relative_path` when the root is known;
    /// `relative_path` alone otherwise, so a path can still be emitted
    /// before the Wine resolver has anything to prepend.
    pub fn absolute_path(&self) -> String {
        match &self.songs_root {
            Some(root) => format!("{}/{}", root.display(), self.relative_path),
            None => self.relative_path.clone(),
        }
    }
}

enum State {
    NoTarget,
    TargetFound,
    Scanned,
}

/// Per-process-incarnation state cached across ticks: everything that is
/// invalidated together when the target dies or a walk aborts.
struct Incarnation {
    pid: i32,
    songs_root: Option<PathBuf>,
    anchor: Option<BaseAnchor>,
}

impl Incarnation {
    fn new(pid: i32) -> Incarnation {
        Incarnation { pid, songs_root: None, anchor: None }
    }
}

/// Drives the whole observer to completion or until `stop` is set.
///
/// Returns the last successfully observed [`Report::absolute_path`], or
/// `None` if the loop stopped without ever producing one.
pub fn start(options: Options, stop: Arc<AtomicBool>) -> Option<String> {
    let mut ctx = ScanContext::new();
    let mut state = State::NoTarget;
    let mut incarnation: Option<Incarnation> = None;
    let mut last_emitted: Option<String> = None;
    let mut waiting_diagnostic_shown = false;
    let mut last_report: Option<Report> = None;
    // One scratch-buffer pool for the whole run, sized to cover the
    // largest request any component issues (a scan window), reused for
    // every pointer/string read as well.
    let mut pool = BufferPool::new(SCAN_WINDOW_LEN);

    while !stop.load(Ordering::SeqCst) {
        match state {
            State::NoTarget => {
                process_locator::locate(&mut ctx);
                match ctx.status {
                    Status::StillAlive | Status::DiscoveredThisTick => {
                        log::info!("found target process (pid {})", ctx.pid);
                        incarnation = Some(Incarnation::new(ctx.pid));
                        waiting_diagnostic_shown = false;
                        state = State::TargetFound;
                        continue;
                    }
                    Status::Missing | Status::Unknown => {
                        if !waiting_diagnostic_shown {
                            log::info!("waiting for osu!.exe");
                            waiting_diagnostic_shown = true;
                        }
                        sleep_unless_stopped(&stop, TICK_NO_TARGET);
                    }
                }
            }
            State::TargetFound => {
                let inc = incarnation.as_mut().expect("TargetFound implies an incarnation");

                if inc.songs_root.is_none() {
                    inc.songs_root = wine::resolve_songs_root(inc.pid);
                    if inc.songs_root.is_none() {
                        log::warn!("could not resolve songs root for pid {}; emits will use a bare relative path", inc.pid);
                    }
                }

                let reader = RemoteReader::new(inc.pid);
                match signature_scan::scan(&reader, &mut pool) {
                    Some(anchor) => {
                        log::debug!("signature found at {:#x}", anchor.0);
                        inc.anchor = Some(anchor);
                        state = State::Scanned;
                        continue;
                    }
                    None => {
                        log::debug!("signature scan missed; backing off");
                        sleep_unless_stopped(&stop, TICK_SCAN_BACKOFF);
                    }
                }
            }
            State::Scanned => {
                if !os_bridge::is_alive(ctx.pid) {
                    log::info!("target process disappeared");
                    ctx.invalidate();
                    incarnation = None;
                    state = State::NoTarget;
                    continue;
                }

                let inc = incarnation.as_mut().expect("Scanned implies an incarnation");
                let anchor = inc.anchor.expect("Scanned implies an anchor");

                let reader = RemoteReader::new(inc.pid);

                match pointer_walk::walk(&reader, &mut pool, anchor) {
                    Ok(relative_path) => {
                        let report = Report { songs_root: inc.songs_root.clone(), relative_path };
                        let absolute = report.absolute_path();

                        if last_emitted.as_deref() != Some(absolute.as_str()) {
                            log::info!("beatmap changed: {}", absolute);
                            emit(&options, &absolute);
                            last_emitted = Some(absolute.clone());
                            last_report = Some(report);

                            if options.run_once {
                                stop.store(true, Ordering::SeqCst);
                                return Some(absolute);
                            }
                        }

                        sleep_unless_stopped(&stop, TICK_ACTIVE);
                    }
                    Err(WalkError::PointerInvalid) | Err(WalkError::StringInvalid) => {
                        log::debug!("pointer walk aborted; discarding anchor and rescanning");
                        inc.anchor = None;
                        state = State::TargetFound;
                    }
                }
            }
        }
    }

    last_report.map(|r| r.absolute_path())
}

fn emit(options: &Options, absolute_path: &str) {
    if options.write_to_file {
        if let Err(e) = sink::write_report(&options.file_path, absolute_path) {
            log::warn!("failed to write sink file {}: {}", options.file_path.display(), e);
        }
    }
}

fn sleep_unless_stopped(stop: &Arc<AtomicBool>, dur: Duration) {
    if !stop.load(Ordering::SeqCst) {
        thread::sleep(dur);
    }
}
