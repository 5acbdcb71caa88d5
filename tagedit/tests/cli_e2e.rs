// This file is part of the product TagEdit.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use tagedit::tags::{TagId, codec};
use tagedit::util::test_fixtures::TestFixtureRoot;

const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<taglist xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <tag id="1" name="Animation - Modified">
    <beth>Animation</beth>
    <gems xsi:nil="true" />
    <nexus type="category">Animation</nexus>
    <nexus type="tag">Animation - Modified</nexus>
    <steam>Animation: Modified</steam>
  </tag>
  <tag id="4" name="Armour">
    <gems>armour</gems>
  </tag>
</taglist>
"#;

fn run_cli(root: &Path, args: &[&str]) -> std::process::Output {
    let binary = env!("CARGO_BIN_EXE_tagedit");
    Command::new(binary)
        .arg("-C")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run tagedit cli")
}

fn run_shell(root: &Path, script: &str) -> std::process::Output {
    let binary = env!("CARGO_BIN_EXE_tagedit");
    let mut child = Command::new(binary)
        .arg("-C")
        .arg(root)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn tagedit shell");
    child
        .stdin
        .take()
        .expect("shell stdin")
        .write_all(script.as_bytes())
        .expect("write script");
    child.wait_with_output().expect("wait for shell")
}

fn sample_fixture(prefix: &str) -> TestFixtureRoot {
    let fixture = TestFixtureRoot::new_unique(prefix).unwrap();
    fixture.write_database(SAMPLE).unwrap();
    fixture
}

#[test]
fn cli_tag_list_and_show() {
    let fixture = sample_fixture("e2e-list");

    let output = run_cli(fixture.path(), &["tag", "list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "1\tAnimation - Modified\n4\tArmour\n");

    let output = run_cli(fixture.path(), &["t", "print", "Armour", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("4: Armour\n"));
    assert!(stdout.contains("1: Animation - Modified\n"));
    assert!(stdout.contains("  steam: Animation: Modified\n"));
}

#[test]
fn cli_tag_crud_roundtrip() {
    let fixture = sample_fixture("e2e-crud");

    let output = run_cli(
        fixture.path(),
        &["tag", "add", "", "gem-1", "", "Cheats", "", "Cheats and God items"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");

    let output = run_cli(
        fixture.path(),
        &["tag", "edit", "5", "nexus", "category:Cheats", "tag:Cheats"],
    );
    assert!(output.status.success());

    let output = run_cli(fixture.path(), &["tag", "edit", "Armour", "name", "Heavy", "Armour"]);
    assert!(output.status.success());

    let stored = codec::decode(&fixture.read_database().unwrap()).unwrap();
    let added = stored.get(&TagId::new(5)).expect("added tag present");
    assert_eq!(added.name, "Cheats and God items");
    assert_eq!(added.gems, vec!["gem-1".to_string()]);
    assert_eq!(added.nexus.category, vec!["Cheats".to_string()]);
    assert_eq!(added.nexus.tag, vec!["Cheats".to_string()]);
    assert_eq!(stored.get(&TagId::new(4)).unwrap().name, "Heavy Armour");

    let output = run_cli(fixture.path(), &["tag", "rm", "Heavy Armour", "5"]);
    assert!(output.status.success());
    let stored = codec::decode(&fixture.read_database().unwrap()).unwrap();
    assert_eq!(stored.keys().copied().collect::<Vec<_>>(), vec![TagId::new(1)]);
}

#[test]
fn cli_failures_leave_database_untouched() {
    let fixture = sample_fixture("e2e-fail");

    let output = run_cli(fixture.path(), &["tag", "delete", "Armour", "Ghost"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("No such tag \"Ghost\""));

    let output = run_cli(fixture.path(), &["tag", "add", "a", "b", "c"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run_cli(fixture.path(), &["tag", "edit", "1", "colour", "red"]);
    assert_eq!(output.status.code(), Some(1));

    assert_eq!(fixture.read_database().unwrap(), SAMPLE);
}

#[test]
fn cli_usage_errors_exit_with_two() {
    let fixture = sample_fixture("e2e-usage");

    let output = run_cli(fixture.path(), &["bogus", "list"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown domain"));

    let output = run_cli(fixture.path(), &["tag", "list", "extra"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn cli_db_commands() {
    let fixture = sample_fixture("e2e-db");

    let output = run_cli(fixture.path(), &["db", "check"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("2 tags"));

    let output = run_cli(fixture.path(), &["db", "next-id"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "5\n");
}

#[test]
fn cli_reports_duplicate_ids() {
    let fixture = TestFixtureRoot::new_unique("e2e-dup").unwrap();
    fixture
        .write_database(r#"<taglist><tag id="1" name="A" /><tag id="1" name="B" /></taglist>"#)
        .unwrap();

    let output = run_cli(fixture.path(), &["db", "check"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Duplicate tag ID: 1"));
}

#[test]
fn init_bootstraps_a_fresh_root() {
    let temp = tempfile::Builder::new()
        .prefix("tagedit-init")
        .tempdir()
        .expect("tempdir");

    let output = run_cli(temp.path(), &["init"]);
    assert!(output.status.success());
    assert!(temp.path().join("config.yaml").exists());
    assert!(temp.path().join("tags.xml").exists());

    let output = run_cli(temp.path(), &["db", "next-id"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
}

#[test]
fn config_points_at_another_database() {
    let fixture = TestFixtureRoot::new_unique("e2e-config").unwrap();
    fixture
        .write_config("database:\n  path: data/custom.xml\n")
        .unwrap();
    std::fs::create_dir_all(fixture.path().join("data")).unwrap();
    std::fs::write(fixture.path().join("data/custom.xml"), SAMPLE).unwrap();

    let output = run_cli(fixture.path(), &["tag", "list"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("4\tArmour"));
}

#[test]
fn shell_session_saves_on_request() {
    let fixture = sample_fixture("e2e-shell");

    let output = run_shell(
        fixture.path(),
        "list\nedit Armour steam \"Armour Mods\"\nsave\nexit\n",
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Animation - Modified\nArmour\n"));
    assert!(stdout.contains("Bye!"));

    let stored = codec::decode(&fixture.read_database().unwrap()).unwrap();
    assert_eq!(
        stored.get(&TagId::new(4)).unwrap().steam,
        vec!["Armour Mods".to_string()]
    );
}

#[test]
fn shell_discards_unsaved_changes_on_confirmed_exit() {
    let fixture = sample_fixture("e2e-shell-discard");

    let output = run_shell(fixture.path(), "delete 1\nexit\nyes\n");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Are you sure you want to continue? [Y/n]"));
    assert_eq!(fixture.read_database().unwrap(), SAMPLE);
}

#[test]
fn shell_exits_with_one_when_input_ends_at_the_discard_question() {
    let fixture = sample_fixture("e2e-shell-eof");

    let output = run_shell(fixture.path(), "delete 1\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("unsaved changes were discarded"));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("Input ended before the unsaved changes were confirmed")
    );
    assert_eq!(fixture.read_database().unwrap(), SAMPLE);
}

#[test]
fn cli_help_flag_after_the_command_is_a_usage_error() {
    let fixture = sample_fixture("e2e-help-late");

    let output = run_cli(fixture.path(), &["tag", "list", "--help"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not take"));
}
