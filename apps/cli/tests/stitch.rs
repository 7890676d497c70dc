use std::error::Error;
use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn stitch_trims_and_drops_empty_fragments() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("one.txt"), "  a  ")?;
    fs::write(dir.path().join("two.txt"), "\n\n")?;
    fs::write(dir.path().join("three.txt"), "b\n")?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["stitch", "one.txt", "two.txt", "three.txt"])
        .assert()
        .success()
        .stdout("a\n\nb\n");

    Ok(())
}

#[test]
fn stitch_writes_output_file() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("head.py"), "import os\n")?;
    fs::write(dir.path().join("body.py"), "print(os.getcwd())\n")?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["stitch", "head.py", "body.py", "--output", "joined.py"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stitched 2 chunks"));

    let joined = fs::read_to_string(dir.path().join("joined.py"))?;
    assert_eq!(joined, "import os\n\nprint(os.getcwd())");
    Ok(())
}

#[test]
fn stitching_only_blank_fragments_is_reported() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    fs::write(dir.path().join("blank.txt"), "   \n")?;

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .args(["stitch", "blank.txt", "--output", "out.txt"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No chunks to stitch."));

    assert!(!dir.path().join("out.txt").exists());
    Ok(())
}

#[test]
fn more_than_twenty_fragments_are_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let mut names = Vec::new();
    for index in 0..21 {
        let name = format!("part{index}.txt");
        fs::write(dir.path().join(&name), "x")?;
        names.push(name);
    }

    Command::cargo_bin("ika-cli")?
        .current_dir(dir.path())
        .arg("stitch")
        .args(&names)
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 20"));

    Ok(())
}
