use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn list_shows_builtins_without_user_folder() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["snippets", "list", "--language", "html"])
        .assert()
        .success()
        .stdout("button\ndiv\nh1\npage\n");

    Ok(())
}

#[test]
fn saved_snippet_overrides_builtin() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["snippets", "save", "--language", "python", "--name", "func"])
        .write_stdin("def mine():\n    return 42\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved snippet 'func'"));

    let stored = dir.path().join("snippets").join("python").join("func.txt");
    assert_eq!(fs::read_to_string(stored)?, "def mine():\n    return 42\n");

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["snippets", "show", "--language", "python", "-n", "func"])
        .assert()
        .success()
        .stdout("def mine():\n    return 42\n");

    Ok(())
}

#[test]
fn save_reads_body_from_file_and_honours_config_root() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(
        dir.path().join("custom.json"),
        r#"{ "paths": { "snippets_root": "my-snippets" } }"#,
    )?;
    fs::write(dir.path().join("nav.html"), "<nav></nav>")?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args([
            "--config",
            "custom.json",
            "snippets",
            "save",
            "--language",
            "html",
            "--name",
            "nav",
            "--from",
            "nav.html",
        ])
        .assert()
        .success();

    assert!(dir
        .path()
        .join("my-snippets")
        .join("html")
        .join("nav.txt")
        .is_file());
    Ok(())
}

#[test]
fn empty_body_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["snippets", "save", "--language", "python", "--name", "x"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("select text first"));

    assert!(!dir.path().join("snippets").exists());
    Ok(())
}

#[test]
fn builtins_cannot_be_removed() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["snippets", "remove", "--language", "python", "--name", "class"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("built in"));

    Ok(())
}
