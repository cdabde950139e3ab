#![cfg(all(unix, feature = "cli"))]

use std::path::PathBuf;
use std::process::{Command, Output};

const MISSING_PORT: &str = "/dev/jqserial-test-no-such-port";

fn jqserial(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jqserial"))
        .env_remove("JQSERIAL_PORT")
        .env_remove("JQSERIAL_CONFIG")
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("jqserial should run")
}

fn temp_file(tag: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "jqserial-cli-{tag}-{}-{}.json",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, contents).expect("temp file should be writable");
    path
}

#[test]
fn version_prints_crate_version() {
    let output = jqserial(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("jqserial {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_lists_features() {
    let output = jqserial(&["version", "--extended"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name: jqserial"));
    assert!(stdout.contains("cli=true"));
}

#[test]
fn missing_port_flag_returns_64() {
    let output = jqserial(&["status"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no serial port given"));
}

#[test]
fn nonexistent_port_returns_3() {
    let output = jqserial(&["--port", MISSING_PORT, "play"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(MISSING_PORT));
}

#[test]
fn unknown_raw_command_returns_64_before_opening() {
    let output = jqserial(&["--port", MISSING_PORT, "raw", "louder"]);
    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown command 'louder'"));
}

#[test]
fn invalid_config_file_returns_60() {
    let config = temp_file("bad", "{ not json");
    let output = jqserial(&[
        "--port",
        MISSING_PORT,
        "--config",
        config.to_str().expect("utf-8 path"),
        "status",
    ]);
    assert_eq!(output.status.code(), Some(60));
    let _ = std::fs::remove_file(&config);
}

#[test]
fn valid_config_file_reaches_the_port() {
    let config = temp_file("good", r#"{"status_checks": 3}"#);
    let output = jqserial(&[
        "--port",
        MISSING_PORT,
        "--config",
        config.to_str().expect("utf-8 path"),
        "status",
    ]);
    assert_eq!(output.status.code(), Some(3));
    let _ = std::fs::remove_file(&config);
}

#[test]
fn volume_out_of_range_is_rejected_by_parser() {
    let output = jqserial(&["--port", MISSING_PORT, "volume", "31"]);
    assert_eq!(output.status.code(), Some(2));
}
