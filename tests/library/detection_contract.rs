use assert_fs::TempDir;
use assert_fs::prelude::*;
use mtdeploy::{AppError, InstallState};
use predicates::prelude::*;
use serial_test::serial;

#[test]
#[serial]
fn detect_classifies_without_touching_the_directory() {
    let temp = TempDir::new().unwrap();
    let target = temp.child("mtproxy");

    assert_eq!(mtdeploy::detect(target.path()).unwrap(), InstallState::Absent);
    target.assert(predicate::path::missing());

    target.create_dir_all().unwrap();
    assert_eq!(mtdeploy::detect(target.path()).unwrap(), InstallState::Absent);

    target.child("notes.txt").write_str("mine").unwrap();
    assert_eq!(mtdeploy::detect(target.path()).unwrap(), InstallState::Foreign);
    target.child("notes.txt").assert("mine");
}

#[test]
#[serial]
fn unreadable_tool_config_fails_every_entry_point() {
    let temp = TempDir::new().unwrap();
    let missing = temp.child("absent.toml");

    unsafe {
        std::env::set_var("MTDEPLOY_CONFIG", missing.path());
    }
    let result = mtdeploy::detect(temp.path());
    unsafe {
        std::env::remove_var("MTDEPLOY_CONFIG");
    }

    match result {
        Err(AppError::Configuration(message)) => assert!(message.contains("absent.toml")),
        other => panic!("expected configuration error, got {:?}", other),
    }
}
