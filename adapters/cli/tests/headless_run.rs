use std::{fs, process::Command};

fn snake_pilot() -> Command {
    Command::new(env!("CARGO_BIN_EXE_snake-pilot"))
}

#[test]
fn autopilot_run_prints_a_summary() {
    let output = snake_pilot()
        .args(["--size", "12", "--seed", "3", "--ticks", "40", "--autopilot"])
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("ticks: "), "missing summary in {stdout}");
}

#[test]
fn render_flag_prints_glyph_frames() {
    let output = snake_pilot()
        .args(["--size", "8", "--obstacles", "0", "--ticks", "1", "--render"])
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("snake-pilot\n"));
    assert!(stdout.contains('@'));
    assert!(stdout.contains('*'));
    assert!(stdout.contains("AUTOPILOT: OFF"));
}

#[test]
fn color_flag_prints_ansi_frames() {
    let output = snake_pilot()
        .args(["--size", "5", "--obstacles", "0", "--ticks", "0", "--color"])
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("snake-pilot\n"));
    assert!(stdout.contains("\x1b[38;2;0;200;100m@\x1b[0m"));
}

#[test]
fn oversized_obstacle_count_is_reported_not_panicked() {
    let output = snake_pilot()
        .args(["--size", "6", "--obstacles", "1000000000000000"])
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("panicked"), "unexpected panic: {stderr}");
    assert!(stderr.contains("failed to set up the first episode"));
}

#[test]
fn config_file_is_loaded_and_overridden() {
    let dir = std::env::temp_dir().join(format!("snake-pilot-cli-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("world.toml");
    fs::write(&path, "obstacle_count = 3\n[grid]\ncolumns = 9\nrows = 7\n").expect("write config");

    let output = snake_pilot()
        .arg("--config")
        .arg(&path)
        .args(["--ticks", "0", "--render"])
        .output()
        .expect("binary runs");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let grid_rows: Vec<&str> = stdout
        .lines()
        .skip(1)
        .take_while(|line| line.chars().all(|c| ".#*o@".contains(c)) && !line.is_empty())
        .collect();
    assert_eq!(grid_rows.len(), 7);
    assert!(grid_rows.iter().all(|row| row.len() == 9));
    let obstacles: usize = grid_rows.iter().map(|row| row.matches('#').count()).sum();
    assert_eq!(obstacles, 3);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_config_file_fails_with_context() {
    let output = snake_pilot()
        .args(["--config", "no/such/world.toml"])
        .output()
        .expect("binary runs");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read world config"));
}
