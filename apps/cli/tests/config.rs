use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn show_prints_defaults_without_a_config_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"debounce_ms\": 300")
                .and(predicate::str::contains("\"snippets_root\": \"snippets\"")),
        );

    assert!(!dir.path().join("ika.json").exists());
    Ok(())
}

#[test]
fn set_writes_sanitized_values() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args([
            "config",
            "set",
            "--interpreter",
            "python3.12",
            "--debounce-ms",
            "10",
            "--font-size",
            "20",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    let written = fs::read_to_string(dir.path().join("ika.json"))?;
    assert!(written.contains("\"interpreter\": \"python3.12\""));
    assert!(written.contains("\"debounce_ms\": 50"));
    assert!(written.contains("\"font_size\": 20"));
    Ok(())
}

#[test]
fn malformed_config_is_an_error() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("broken.json"), "{ not json")?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["--config", "broken.json", "assets", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("load config"));

    Ok(())
}
