fn main() {
    // Wine prefixes and /proc-based memory inspection only make sense on
    // a Linux host; there's no such thing as a Wine prefix on any other
    // target this crate could plausibly be built for.
    #[cfg(not(target_os = "linux"))]
    compile_error!("osu-memory-watch only supports Linux hosts (procfs + process_vm_readv + Wine prefixes are all Linux-specific)")
}
