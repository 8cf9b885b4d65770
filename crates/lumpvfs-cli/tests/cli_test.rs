//! Integration tests for the lumpvfs binary

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use assert_cmd::Command;
use lumpvfs_test_utils::{WadBuilder, ZipBuilder, temp_dir, write_fixture};
use predicates::prelude::*;

fn lumpvfs() -> Command {
    Command::cargo_bin("lumpvfs").unwrap()
}

#[test]
fn test_help_lists_commands() {
    lumpvfs()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("extract"));
}

#[test]
fn test_list_requires_containers() {
    lumpvfs().arg("list").assert().failure();
}

#[test]
fn test_list_shows_winning_records() {
    let dir = temp_dir();
    let base = write_fixture(
        dir.path(),
        "base.wad",
        &WadBuilder::iwad().lump("PLAYPAL", b"old").lump("COLORMAP", b"cm").build(),
    );
    let patch = write_fixture(
        dir.path(),
        "patch.pk3",
        &ZipBuilder::new().stored("playpal.lmp", b"new!").build(),
    );

    lumpvfs()
        .args(["--format", "json", "list"])
        .arg(&base)
        .arg(&patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"PLAYPAL\""))
        .stdout(predicate::str::contains("\"path\": \"playpal.lmp\""))
        .stdout(predicate::str::contains("\"shadowed\": true").not());

    lumpvfs()
        .args(["list", "--all"])
        .arg(&base)
        .arg(&patch)
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAYPAL (shadowed)"))
        .stdout(predicate::str::contains("3 records"));
}

#[test]
fn test_log_level_after_subcommand() {
    let dir = temp_dir();
    let wad = WadBuilder::pwad().lump("PLAYPAL", b"pal").build();
    let base = write_fixture(dir.path(), "base.wad", &wad);

    lumpvfs()
        .args(["list", "--log-level", "debug"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("PLAYPAL"))
        .stderr(predicate::str::contains("sniffed as"));
}

#[test]
fn test_list_namespace_filter() {
    let dir = temp_dir();
    let zip = write_fixture(
        dir.path(),
        "mod.pk3",
        &ZipBuilder::new()
            .stored("sprites/possa1.png", b"sprite")
            .stored("mapinfo.txt", b"map")
            .build(),
    );

    lumpvfs()
        .args(["list", "--namespace", "sprites"])
        .arg(&zip)
        .assert()
        .success()
        .stdout(predicate::str::contains("POSSA1"))
        .stdout(predicate::str::contains("MAPINFO").not());
}

#[test]
fn test_info_reports_containers() {
    let dir = temp_dir();
    let wad = WadBuilder::iwad().lump("MAP01", b"x").build();
    let base = write_fixture(dir.path(), "doom.wad", &wad);

    lumpvfs()
        .args(["info"])
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("doom.wad"))
        .stdout(predicate::str::contains("1 containers, 1 records"));
}

#[test]
fn test_extract_writes_record() {
    let dir = temp_dir();
    let image = WadBuilder::pwad().lump("DEMO1", b"demo").build();
    let wad = write_fixture(dir.path(), "demo.wad", &image);
    let out = dir.path().join("demo1.lmp");

    lumpvfs()
        .args(["extract", "--name", "demo1", "--out"])
        .arg(&out)
        .arg(&wad)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote DEMO1"));
    assert_eq!(std::fs::read(&out).unwrap(), b"demo");
}

#[test]
fn test_extract_missing_name_fails() {
    let dir = temp_dir();
    let image = WadBuilder::pwad().lump("DEMO1", b"demo").build();
    let wad = write_fixture(dir.path(), "demo.wad", &image);

    lumpvfs()
        .args(["extract", "--name", "DEMO2", "--out"])
        .arg(dir.path().join("out.lmp"))
        .arg(&wad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record not found: DEMO2"));
}

#[test]
fn test_missing_container_fails() {
    lumpvfs()
        .args(["info", "/nonexistent/doom.wad"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot open"));
}
