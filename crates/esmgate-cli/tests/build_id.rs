//! Integration tests for `esmgate build-id` and `esmgate version`.

use std::process::Command;

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "esmgate-cli", "--bin", "esmgate", "--"]);
    cmd
}

#[test]
fn test_build_id_plain() {
    let output = cargo_bin()
        .args(["build-id", "react-dom@18.2.0/client", "--target", "es2022"])
        .output()
        .expect("Failed to run build-id command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "v1/react-dom@18.2.0/es2022/client.js");
}

#[test]
fn test_build_id_json_scoped_dev() {
    let output = cargo_bin()
        .args(["--json", "build-id", "@vue/shared@3.3.4", "--dev"])
        .env_remove("ESMGATE_TARGET")
        .output()
        .expect("Failed to run build-id command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(
        json["build_id"],
        "v1/@vue/shared@3.3.4/es2020/shared.development.js"
    );
    assert_eq!(
        json["artifact"],
        "builds/v1/@vue/shared@3.3.4/es2020/shared.development.js"
    );
}

#[test]
fn test_build_id_rejects_bad_version() {
    let output = cargo_bin()
        .args(["build-id", "react@latest"])
        .output()
        .expect("Failed to run build-id command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid package specifier"), "stderr: {stderr}");
}

#[test]
fn test_build_id_rejects_parent_segments() {
    let output = cargo_bin()
        .args(["build-id", "foo@1.0.0/../../x"])
        .output()
        .expect("Failed to run build-id command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("submodule must stay inside the package"), "stderr: {stderr}");
}

#[test]
fn test_version_json() {
    let output = cargo_bin()
        .args(["--json", "version"])
        .output()
        .expect("Failed to run version command");

    assert!(output.status.success());
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert!(json["version"].is_string());
    assert_eq!(json["schema_version"], 1);
}
