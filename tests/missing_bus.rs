use std::process::Command;

#[test]
fn missing_bus_exits_with_failure() {
    let output = Command::new(env!("CARGO_BIN_EXE_icp10111"))
        .args(["--bus", "/dev/i2c-does-not-exist", "--count", "1"])
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Sample |"));
    assert!(!stdout.contains("Error"));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("/dev/i2c-does-not-exist"));
}
