use std::fs;

use ika_assets::AssetManager;
use tempfile::tempdir;

#[test]
fn adding_same_name_twice_appends_numeric_suffix() {
    let temp = tempdir().expect("tempdir");
    let source = temp.path().join("pic.png");
    fs::write(&source, [0x89, b'P', b'N', b'G']).expect("write source");
    let manager = AssetManager::new(temp.path().join("assets"));

    let first = manager.add(&source).expect("first copy");
    let second = manager.add(&source).expect("second copy");
    let third = manager.add(&source).expect("third copy");

    assert_eq!(first.file_name().unwrap(), "pic.png");
    assert_eq!(second.file_name().unwrap(), "pic_1.png");
    assert_eq!(third.file_name().unwrap(), "pic_2.png");
    assert_eq!(fs::read(&second).unwrap(), [0x89, b'P', b'N', b'G']);
}

#[test]
fn list_filters_to_images() {
    let temp = tempdir().expect("tempdir");
    let manager = AssetManager::new(temp.path());
    fs::write(temp.path().join("logo.PNG"), b"x").unwrap();
    fs::write(temp.path().join("photo.jpeg"), b"x").unwrap();
    fs::write(temp.path().join("readme.md"), b"x").unwrap();

    let mut names = manager.list().expect("list");
    names.sort();
    assert_eq!(names, ["logo.PNG", "photo.jpeg"]);
}

#[test]
fn copy_keeps_source_untouched() {
    let temp = tempdir().expect("tempdir");
    let source_dir = temp.path().join("downloads");
    fs::create_dir(&source_dir).unwrap();
    let source = source_dir.join("cat.gif");
    fs::write(&source, b"GIF89a").unwrap();

    let manager = AssetManager::new(temp.path().join("assets"));
    let copied = manager.add(&source).expect("copy");

    assert!(source.exists());
    assert_eq!(copied.parent().unwrap(), manager.dir());
    assert_eq!(fs::read(copied).unwrap(), b"GIF89a");
}
