//! The `foray` binary end to end.

use std::io::Write;
use std::process::{Command, Output, Stdio};

const GAME: &str = "turn 0\nloadtime 3000\nturntime 1000\nrows 3\ncols 3\nturns 5\n\
viewradius2 9\nattackradius2 5\nspawnradius2 1\nplayer_seed 3\nready\n\
turn 1\nh 0 0 0\na 0 0 0\nf 1 1\ngo\n\
end\nplayers 2\nscore 1 0\ngo\n";

fn foray(dir: &std::path::Path, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_foray"))
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

#[test]
fn init_writes_a_loadable_config() {
    let dir = tempfile::tempdir().unwrap();
    let out = foray(dir.path(), &["init"], "");
    assert!(out.status.success());

    let text = std::fs::read_to_string(dir.path().join("foray.toml")).unwrap();
    assert!(text.contains("[engine]"));
    assert!(text.contains("max_search_radius = 40"));
    assert!(text.contains("[logging]"));

    // a second init leaves the file alone
    std::fs::write(dir.path().join("foray.toml"), "[logging]\nlevel = \"warn\"\n").unwrap();
    assert!(foray(dir.path(), &["init"], "").status.success());
    let kept = std::fs::read_to_string(dir.path().join("foray.toml")).unwrap();
    assert!(kept.contains("warn"));
}

#[test]
fn play_answers_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let out = foray(dir.path(), &["--log-level", "off", "play"], GAME);
    assert!(out.status.success());

    let wire = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = wire.lines().collect();
    assert_eq!(lines.len(), 3, "unexpected output {wire:?}");
    assert_eq!(lines[0], "go");
    assert!(lines[1] == "o 0 0 E" || lines[1] == "o 0 0 S", "{:?}", lines[1]);
    assert_eq!(lines[2], "go");
}

#[test]
fn play_fails_on_a_broken_stream() {
    let dir = tempfile::tempdir().unwrap();
    let out = foray(dir.path(), &["--log-level", "off", "play"], "turn 0\nrows 3\n");
    assert!(!out.status.success());
}

#[test]
fn replay_emits_json_reports() {
    let dir = tempfile::tempdir().unwrap();
    let recording = dir.path().join("game.txt");
    std::fs::write(&recording, GAME).unwrap();

    let out = foray(
        dir.path(),
        &["--log-level", "off", "replay", "--json", "game.txt"],
        "",
    );
    assert!(out.status.success());

    let stdout = String::from_utf8(out.stdout).unwrap();
    let reports: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["turn"], 1);
    assert_eq!(reports[0]["orders"].as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["catalog"]["eat"], 4);
}

#[test]
fn replay_summarizes_the_game() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("game.txt"), GAME).unwrap();

    let out = foray(dir.path(), &["--log-level", "off", "replay", "game.txt"], "");
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Turns:"), "{stdout}");
    // a 3x3 map is fully in view from the hill
    assert!(stdout.contains("Map seen:"), "{stdout}");
    assert!(stdout.contains("100.0%"), "{stdout}");
}

#[test]
fn bad_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("foray.toml"),
        "[engine.priorities]\neat = 1.0\nexplore = 5.0\n",
    )
    .unwrap();
    let out = foray(dir.path(), &["play"], GAME);
    assert!(!out.status.success());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("priorities"), "{stderr}");
}
