use std::process::Command;

fn rule_of_five(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rule-of-five"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("binary runs")
}

#[test]
fn no_selector_runs_first_exercise() {
    let output = rule_of_five(&["--no-color"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Running program 1.1...");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "🚀 Exercise 1.1");
    assert_eq!(lines[3], "  t1: Constructor");
    assert_eq!(lines[4], "  t1: COPY CONSTRUCTOR from t1");
}

#[test]
fn indent_from_config_reaches_terminal_output() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut file, b"indent = 4\ncolor = false\n").unwrap();
    let path = file.path().to_str().unwrap().to_string();

    let output = rule_of_five(&["--config", &path, "run", "1.1"]);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().any(|line| line == "    t1: Constructor"));
}

#[test]
fn unknown_selector_exits_with_code_two() {
    let output = rule_of_five(&["--no-color", "run", "9.9"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Unknown scenario '9.9'"));
}
