use flamecafe::commands::{execute_inspect, execute_replay, ReplayArgs};
use flamecafe::output::read_folded;
use flamecafe::replay::{run_scenario, Scenario};
use flamecafe::utils::config::Settings;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

fn demo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/scenario.json")
}

fn sorted_lines(path: &std::path::Path) -> Vec<String> {
    let mut lines: Vec<String> = read_folded(path)
        .unwrap()
        .iter()
        .map(|stack| stack.to_line())
        .collect();
    lines.sort();
    lines
}

#[test]
fn test_demo_scenario_end_to_end() {
    let scenario = Scenario::load(demo_path()).unwrap();
    let settings = scenario.settings.clone().unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = run_scenario(&scenario, settings, dir.path());

    assert_eq!(report.frames, 5);
    // the tick in frame 0 happens before the timer starts
    assert_eq!(report.ticks_fired, 7);
    assert_eq!(report.samples_skipped(), 2);
    assert!(!report.window_open_at_end);
    assert_eq!(report.windows.len(), 1);

    let window = &report.windows[0];
    assert_eq!(window.closed_at_frame, 3);
    assert_eq!(window.stats.total_samples, 5);
    assert_eq!(window.stats.distinct_stacks, 2);
    assert_eq!(window.stats.max_depth, 3);

    let path = window.output.as_ref().unwrap();
    assert_eq!(sorted_lines(path), vec!["main;bar 2", "main;bar;foo 3"]);
}

#[test]
fn test_disabled_settings_produce_no_capture() {
    let scenario = Scenario::load(demo_path()).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let report = run_scenario(&scenario, Settings::new().with_enabled(false), dir.path());

    assert_eq!(report.ticks_fired, 0);
    assert!(report.windows.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_replay_command_writes_and_inspects() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("captures");

    let written = execute_replay(ReplayArgs {
        scenario: demo_path(),
        out_dir: out_dir.clone(),
        settings: None,
    })
    .unwrap();

    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with(&out_dir));

    let stats = execute_inspect(&written[0], 5).unwrap();
    assert_eq!(stats.total_samples, 5);
    assert_eq!(stats.distinct_stacks, 2);
}
