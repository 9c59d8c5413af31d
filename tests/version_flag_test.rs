use std::process::Command;

#[test]
fn test_version_flag() {
    let binary_path = env!("CARGO_BIN_EXE_devconsole");

    let output = Command::new(binary_path)
        .arg("--version")
        .output()
        .expect("Failed to execute binary");

    assert!(
        output.status.success(),
        "Version flag should exit with code 0"
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version_part = stdout.trim().strip_prefix("devconsole ").unwrap_or("");
    assert_eq!(version_part, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_help_flag_lists_options() {
    let output = Command::new(env!("CARGO_BIN_EXE_devconsole"))
        .arg("--help")
        .output()
        .expect("Failed to execute binary");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--base-path"));
    assert!(stdout.contains("DEVCONSOLE_ORIGIN"));
}

#[test]
fn test_missing_flag_value_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_devconsole"))
        .arg("--origin")
        .output()
        .expect("Failed to execute binary");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing value for --origin"));
}
