#![forbid(unsafe_code)]

//! End-to-end runs of the subcommands against in-memory output.

use clap::Parser;
use cspdash::cli::{Cli, load_config, run};

fn cspdash(args: &[&str]) -> cspdash_core::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("cspdash").chain(args.iter().copied()))
        .expect("arguments parse");
    let config = load_config(&cli)?;
    let mut out = Vec::new();
    run(cli, &config, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 output"))
}

#[test]
fn statuses_last_only_for_the_run() {
    let marks = ["--status", "P1090=completed", "--status", "P1090=flagged"];

    let mut args = vec!["show", "p1090"];
    args.extend(marks);
    let shown = cspdash(&args).unwrap();
    assert!(shown.contains("合并果子"));
    assert!(shown.contains("有疑问"));

    let mut args = vec!["stats"];
    args.extend(marks);
    assert!(cspdash(&args).unwrap().contains("T1"));

    let fresh = cspdash(&["show", "P1090"]).unwrap();
    assert!(fresh.contains("未完成"));
}

#[test]
fn json_frames_cover_whole_scenario() {
    let text = cspdash(&["frames", "graph", "--json"]).unwrap();
    let frames: Vec<serde_json::Value> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[2]["step_index"], 2);
    assert_eq!(frames[0]["visual"]["renderer"], "graph");
}

#[test]
fn configured_default_speed_applies_to_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cspdash.toml");
    std::fs::write(&path, "default_speed = \"slow\"\n").unwrap();
    let text = cspdash(&["frames", "matrix", "--json", "--config", path.to_str().unwrap()]).unwrap();
    let first: serde_json::Value = serde_json::from_str(text.lines().next().unwrap()).unwrap();
    assert_eq!(first["speed"], "slow");
}

#[test]
fn ask_about_a_problem() {
    let text = cspdash(&["ask", "--problem", "P1090"]).unwrap();
    assert!(text.lines().count() >= 3);
    assert!(text.contains("[you]"));
}
