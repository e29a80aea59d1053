//! Integration tests for `esmgate resolve --json` and `esmgate lookup`.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::{tempdir, TempDir};

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "esmgate-cli", "--bin", "esmgate", "--"]);
    cmd.env_remove("ESMGATE_DB_DIR")
        .env_remove("ESMGATE_STORAGE_DIR")
        .env_remove("ESMGATE_TARGET")
        .env_remove("ESMGATE_CONFIG");
    cmd
}

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn project() -> TempDir {
    let dir = tempdir().unwrap();
    write_files(
        &dir.path().join("node_modules"),
        &[
            (
                "tiny-esm/package.json",
                r#"{ "name": "tiny-esm", "version": "1.0.0", "module": "es/index.js", "main": "lib/index.js" }"#,
            ),
            ("tiny-esm/es/index.js", "export default function tiny() {}\nexport const size = 1;"),
            ("tiny-esm/lib/index.js", "module.exports = function tiny() {};"),
            (
                "tiny-esm/es/extra.js",
                "export const extra = true;",
            ),
            (
                "old-cjs/package.json",
                r#"{ "name": "old-cjs", "version": "0.1.0", "main": "index.js" }"#,
            ),
            ("old-cjs/index.js", "module.exports = { a: 1 };"),
        ],
    );
    dir
}

fn resolve(dir: &TempDir, args: &[&str]) -> (bool, serde_json::Value) {
    let output = cargo_bin()
        .arg("--json")
        .arg("--cwd")
        .arg(dir.path())
        .arg("resolve")
        .args(args)
        .output()
        .expect("Failed to run resolve command");
    let json = serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    (output.status.success(), json)
}

#[test]
fn test_resolve_esm_package() {
    let dir = project();
    let (ok, json) = resolve(&dir, &["tiny-esm@1.0.0"]);
    assert!(ok);

    let entry = &json[0];
    assert_eq!(entry["ok"], true);
    assert_eq!(entry["build_id"], "v1/tiny-esm@1.0.0/es2020/tiny-esm.js");
    assert_eq!(entry["cached"], false);
    assert_eq!(entry["module"]["module"], "es/index.js");
    assert_eq!(entry["module"]["exportDefault"], true);
    assert_eq!(entry["module"]["exports"], serde_json::json!([]));
}

#[test]
fn test_resolve_keeps_argument_order() {
    let dir = project();
    let (ok, json) = resolve(
        &dir,
        &["tiny-esm@1.0.0/es/extra.js", "tiny-esm@1.0.0", "missing@1.0.0"],
    );
    assert!(!ok);

    let results = json.as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["spec"], "tiny-esm@1.0.0/es/extra.js");
    assert_eq!(results[0]["module"]["module"], "es/extra.js");
    assert_eq!(results[0]["module"]["exportDefault"], false);
    assert_eq!(results[1]["spec"], "tiny-esm@1.0.0");
    assert_eq!(results[2]["ok"], false);
    assert!(results[2]["error"].as_str().unwrap().contains("manifest"));
}

#[test]
fn test_resolve_without_export_check_skips_sandbox() {
    let dir = project();
    let (ok, json) = resolve(
        &dir,
        &["old-cjs@0.1.0", "--no-check-exports", "--node", "/nonexistent/node"],
    );
    assert!(ok);
    assert_eq!(json[0]["module"]["main"], "index.js");
    assert_eq!(json[0]["module"]["exportDefault"], false);
}

#[test]
fn test_sandbox_failure_is_reported() {
    let dir = project();
    let (ok, json) = resolve(&dir, &["old-cjs@0.1.0", "--node", "/nonexistent/node"]);
    assert!(!ok);
    assert!(json[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("parseCJSModuleExports: "));
}

#[test]
fn test_lookup_after_resolve() {
    let dir = project();
    let db = dir.path().join("db");
    let storage = dir.path().join("storage");
    let db_arg = db.to_str().unwrap();
    let storage_arg = storage.to_str().unwrap();

    let (ok, json) = resolve(
        &dir,
        &["tiny-esm@1.0.0", "--db-dir", db_arg, "--storage-dir", storage_arg],
    );
    assert!(ok);
    let build_id = json[0]["build_id"].as_str().unwrap().to_string();

    let lookup = |id: &str| -> serde_json::Value {
        let output = cargo_bin()
            .args(["--json", "lookup", id, "--db-dir", db_arg, "--storage-dir", storage_arg])
            .output()
            .expect("Failed to run lookup command");
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
    };

    // No artifact yet, so the entry is stale.
    assert_eq!(lookup(&build_id)["found"], false);

    // The stale entry was dropped; store it again, then publish the artifact.
    let (ok, _) = resolve(
        &dir,
        &["tiny-esm@1.0.0", "--db-dir", db_arg, "--storage-dir", storage_arg],
    );
    assert!(ok);
    write_files(&storage, &[(&format!("builds/{build_id}"), "export default 1;")]);

    let hit = lookup(&build_id);
    assert_eq!(hit["found"], true);
    assert_eq!(hit["has_css"], false);
    assert_eq!(hit["module"]["module"], "es/index.js");

    let (ok, json) = resolve(
        &dir,
        &["tiny-esm@1.0.0", "--db-dir", db_arg, "--storage-dir", storage_arg],
    );
    assert!(ok);
    assert_eq!(json[0]["cached"], true);
}
