//! Integration tests for the rpg CLI commands.

#![allow(deprecated)]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rpgchar() -> Command {
    Command::cargo_bin("rpgchar").unwrap()
}

const CONFIG: &str = "\
game_master: dave
gm_room: main
template_dir: sheets
campaigns:
  tavern:
    characters:
      Aria: aria.yaml
";

const ARIA: &str = "\
name: Aria
level: 1
race: Elf
class_: Rogue
AC: 14
max_hp: 20
abilities: {Dex: 14}
weapons:
  dagger: {damage: 1d4, modifier: Dex}
";

/// A table directory holding a config and one character sheet.
fn table_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sheets")).unwrap();
    fs::write(dir.path().join("sheets/aria.yaml"), ARIA).unwrap();
    fs::write(dir.path().join("table.yaml"), CONFIG).unwrap();
    dir
}

fn chat(dir: &Path, user: &str, room: &str, input: &str) -> assert_cmd::assert::Assert {
    rpgchar()
        .args(["chat", "--config"])
        .arg(dir.join("table.yaml"))
        .arg("--state")
        .arg(dir.join("state.json"))
        .args(["--room", room, "--user", user, "--seed", "7"])
        .write_stdin(input)
        .assert()
}

// ---------------------------------------------------------------------------
// roll
// ---------------------------------------------------------------------------

#[test]
fn roll_prints_faces_and_total() {
    rpgchar()
        .args(["roll", "2d6", "--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2d6: ["))
        .stdout(predicate::str::contains("] = "));
}

#[test]
fn roll_is_reproducible_with_a_seed() {
    let first = rpgchar()
        .args(["roll", "4d20", "--seed", "3"])
        .output()
        .unwrap();
    let second = rpgchar()
        .args(["roll", "4d20", "--seed", "3"])
        .output()
        .unwrap();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn roll_rejects_malformed_spec() {
    rpgchar()
        .args(["roll", "2d6+1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error: malformed damage spec"));
}

// ---------------------------------------------------------------------------
// chat
// ---------------------------------------------------------------------------

#[test]
fn chat_loads_and_introduces_a_character() {
    let dir = table_dir();
    chat(
        dir.path(),
        "dave",
        "tavern",
        "!load Aria aria\n@aria who am I?\n!list characters\n",
    )
    .success()
    .stdout(predicate::str::contains("Character loaded from config."))
    .stdout(predicate::str::contains(
        "You are Aria (Elf Rogue 1), a fearless adventurer!",
    ))
    .stdout(predicate::str::contains("Aria (Elf Rogue 1)"));

    assert!(dir.path().join("state.json").exists());
}

#[test]
fn chat_ignores_ordinary_conversation() {
    let dir = table_dir();
    chat(dir.path(), "aria", "tavern", "hello everyone\n/quit\n")
        .success()
        .stdout(predicate::str::contains("hello").not());
}

#[test]
fn chat_refuses_gm_commands_from_players() {
    let dir = table_dir();
    chat(dir.path(), "aria", "tavern", "!load Aria aria\n")
        .success()
        .stdout(predicate::str::contains("I can't let you do that, aria."));
}

#[test]
fn chat_relays_messages_to_the_gm_room() {
    let dir = table_dir();
    chat(
        dir.path(),
        "aria",
        "tavern",
        "tell the dm I pocket the ring\n",
    )
    .success()
    .stdout(predicate::str::contains("[main]"))
    .stdout(predicate::str::contains("aria says: I pocket the ring"));
}

#[test]
fn chat_runs_a_combat_round() {
    let dir = table_dir();
    chat(
        dir.path(),
        "dave",
        "tavern",
        "!load Aria aria\nroll initiative\nwhose turn is it?\n!init end\n",
    )
    .success()
    .stdout(predicate::str::contains("Aria rolled "))
    .stdout(predicate::str::contains("It's Aria's turn"))
    .stdout(predicate::str::contains("Combat is over!"));
}

#[test]
fn chat_state_survives_between_sessions() {
    let dir = table_dir();
    chat(dir.path(), "dave", "tavern", "!load Aria aria\n").success();
    chat(dir.path(), "aria", "tavern", "how am I?\n")
        .success()
        .stdout(predicate::str::contains("You're completely unharmed! (20/20)"));
}

#[test]
fn chat_room_switch_needs_a_name() {
    let dir = table_dir();
    chat(dir.path(), "dave", "tavern", "/room\n")
        .success()
        .stdout(predicate::str::contains("usage: /room <name>"));
}

#[test]
fn chat_fails_without_config() {
    let dir = TempDir::new().unwrap();
    rpgchar()
        .args(["chat", "--user", "dave", "--config"])
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

#[test]
fn show_empty_room() {
    let dir = TempDir::new().unwrap();
    rpgchar()
        .args(["show", "--room", "tavern", "--state"])
        .arg(dir.path().join("state.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No characters in tavern."))
        .stdout(predicate::str::contains("No combat in progress."));
}

#[test]
fn show_lists_roster_and_initiative() {
    let dir = table_dir();
    chat(dir.path(), "dave", "tavern", "!load Aria aria\nroll initiative\n").success();

    rpgchar()
        .args(["show", "--room", "tavern", "--state"])
        .arg(dir.path().join("state.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Aria"))
        .stdout(predicate::str::contains("20/20"))
        .stdout(predicate::str::contains("Initiative:"))
        .stdout(predicate::str::contains("> Aria ("));
}
