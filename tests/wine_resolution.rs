//! Multi-module integration tests for the Wine path resolver.
//!
//! Builds a synthetic Wine prefix tree -- registry hive, `dosdevices`
//! symlink, per-user config -- and exercises `registry` -> `dosdevices` ->
//! `config` together, the way `wine::resolve_songs_root` chains them. Real
//! `/proc/<pid>` access (loginuid, environ) isn't faked here; that part of
//! the pipeline is covered by `src/wine/mod.rs`'s own unit tests against
//! the live test process.

use std::fs;
use std::io::Write;
use std::os::unix::fs::symlink;

use osu_memory_watch::wine::{config, dosdevices, registry};

fn write_system_reg(prefix: &std::path::Path, install_drive_letter: char) {
    let mut f = fs::File::create(prefix.join("system.reg")).unwrap();
    writeln!(f, "WINE REGISTRY Version 2").unwrap();
    writeln!(f, "[Software\\\\Classes\\\\osu\\\\shell\\\\open\\\\command]").unwrap();
    writeln!(
        f,
        "@=\"\\\"{}:\\\\\\\\Games\\\\\\\\osu!\\\\\\\\osu!.exe\\\" \\\"%1\\\"\"",
        install_drive_letter
    )
    .unwrap();
}

#[test]
fn registry_to_dosdevices_to_config_round_trip() {
    let root = tempfile::tempdir().unwrap();
    let prefix = root.path().join("wineprefix");
    fs::create_dir_all(prefix.join("dosdevices")).unwrap();

    write_system_reg(&prefix, 'C');

    // The real install directory lives anywhere on the host; dosdevices/c:
    // symlinks to it, exactly as a real Wine prefix does for its C: drive.
    let real_install_dir = root.path().join("host_install/Games/osu!");
    fs::create_dir_all(&real_install_dir).unwrap();
    symlink(root.path().join("host_install"), prefix.join("dosdevices/c:")).unwrap();

    fs::create_dir(real_install_dir.join("Songs")).unwrap();
    fs::write(
        real_install_dir.join("osu!.player.cfg"),
        "Username = player\nBeatmapDirectory = Songs\n",
    )
    .unwrap();

    let install_path_win = registry::extract_install_path(&prefix).expect("registry should yield an install path");
    assert!(install_path_win.starts_with("C:\\"));

    let install_dir_unix = dosdevices::to_unix_path(&prefix, &install_path_win).expect("should map to a unix path");
    let install_dir_unix = dosdevices::repair_case(&install_dir_unix).unwrap_or(install_dir_unix);

    let songs_root = config::beatmap_directory(&prefix, &install_dir_unix, "player").expect("config should resolve");
    assert_eq!(songs_root, real_install_dir.join("Songs"));
    assert!(songs_root.is_dir());
}

#[test]
fn case_mismatched_config_value_is_repaired_against_real_directory() {
    let root = tempfile::tempdir().unwrap();
    let prefix = root.path().join("wineprefix");
    fs::create_dir_all(prefix.join("dosdevices")).unwrap();
    write_system_reg(&prefix, 'C');

    let real_install_dir = root.path().join("host_install");
    fs::create_dir_all(&real_install_dir).unwrap();
    symlink(&real_install_dir, prefix.join("dosdevices/c:")).unwrap();

    // On-disk directory is capitalized "Songs"; the config/registry text
    // (as the Windows client wrote it) is lowercase "songs".
    fs::create_dir(real_install_dir.join("Songs")).unwrap();
    fs::write(
        real_install_dir.join("osu!.player.cfg"),
        "BeatmapDirectory = songs\n",
    )
    .unwrap();

    let install_path_win = registry::extract_install_path(&prefix).unwrap();
    let install_dir_unix = dosdevices::to_unix_path(&prefix, &install_path_win).unwrap();
    let install_dir_unix = dosdevices::repair_case(&install_dir_unix).unwrap_or(install_dir_unix);

    let songs_root = config::beatmap_directory(&prefix, &install_dir_unix, "player").expect("config should resolve");
    assert_eq!(songs_root, real_install_dir.join("Songs"));
}

#[test]
fn missing_registry_entry_yields_no_install_path() {
    let root = tempfile::tempdir().unwrap();
    let prefix = root.path().join("wineprefix");
    fs::create_dir_all(&prefix).unwrap();
    fs::write(prefix.join("system.reg"), "[Some\\Other\\Key]\n@=\"nope\"\n").unwrap();
    fs::write(prefix.join("user.reg"), "").unwrap();

    assert!(registry::extract_install_path(&prefix).is_none());
}
