use std::fs;

use autoaway::settings::{Settings, SettingsStore};
use autoaway::Error;
use rstest::*;

mod common;

use common::TempDir;

#[fixture]
fn root() -> TempDir {
    TempDir::new()
}

#[rstest]
fn it_should_populate_defaults_on_first_run(root: TempDir) {
    let dir = root.path().join("autoaway");

    let store = SettingsStore::load(&dir).expect("loading failed");

    assert_eq!(store.settings(), &Settings::default());
    assert_eq!(store.settings().here_nick, "user");
    assert_eq!(store.settings().away_nick, "user|away");
    assert_eq!(store.settings().away_message, "");

    assert!(dir.is_dir());
    assert_eq!(fs::read_to_string(dir.join("here_nick")).unwrap(), "user\n");
    assert_eq!(fs::read_to_string(dir.join("away_nick")).unwrap(), "user|away\n");
    assert_eq!(fs::read_to_string(dir.join("away_msg")).unwrap(), "\n");
}

#[rstest]
fn it_should_write_through_on_every_change(root: TempDir) {
    let mut store = SettingsStore::load(root.path()).expect("loading failed");

    store.set_here_nick("mk").unwrap();
    store.set_away_nick("mk|afk").unwrap();
    store.set_away_message("brb").unwrap();

    let reloaded = SettingsStore::load(root.path()).expect("reloading failed");

    assert_eq!(reloaded.settings().here_nick, "mk");
    assert_eq!(reloaded.settings().away_nick, "mk|afk");
    assert_eq!(reloaded.settings().away_message, "brb");
    assert_eq!(reloaded.settings(), store.settings());
}

#[rstest]
fn it_should_only_read_the_first_line(root: TempDir) {
    fs::create_dir_all(root.path()).unwrap();
    fs::write(root.path().join("away_msg"), "gone fishing\nand hiking\n").unwrap();

    let store = SettingsStore::load(root.path()).expect("loading failed");

    assert_eq!(store.settings().away_message, "gone fishing");
}

#[rstest]
fn it_should_restore_missing_files(root: TempDir) {
    fs::create_dir_all(root.path()).unwrap();
    fs::write(root.path().join("here_nick"), "mk\n").unwrap();

    let store = SettingsStore::load(root.path()).expect("loading failed");

    assert_eq!(store.settings().here_nick, "mk");
    assert_eq!(store.settings().away_nick, "user|away");
    assert_eq!(
        fs::read_to_string(root.path().join("away_nick")).unwrap(),
        "user|away\n"
    );
}

#[rstest]
fn it_should_fall_back_to_defaults_on_unreadable_files(root: TempDir) {
    fs::create_dir_all(root.path().join("here_nick")).unwrap();

    let store = SettingsStore::load(root.path()).expect("loading failed");

    assert_eq!(store.settings().here_nick, "user");
}

#[rstest]
fn it_should_fail_when_the_directory_cannot_be_created(root: TempDir) {
    fs::create_dir_all(root.path()).unwrap();
    fs::write(root.path().join("blocker"), "").unwrap();

    let result = SettingsStore::load(root.path().join("blocker").join("autoaway"));

    assert!(matches!(result, Err(Error::CreateSettingsDirectory { .. })));
}

#[rstest]
fn it_should_keep_the_new_value_when_saving_fails(root: TempDir) {
    let mut store = SettingsStore::load(root.path()).expect("loading failed");

    fs::remove_file(root.path().join("away_msg")).unwrap();
    fs::create_dir(root.path().join("away_msg")).unwrap();

    let result = store.set_away_message("brb");

    assert!(matches!(result, Err(Error::WriteSetting { .. })));
    assert_eq!(store.settings().away_message, "brb");
}

#[rstest]
fn it_should_keep_only_the_first_line_of_a_new_value(root: TempDir) {
    let mut store = SettingsStore::load(root.path()).expect("loading failed");

    store.set_away_message("line one\nline two").unwrap();
    store.set_here_nick("mk\r\n").unwrap();

    assert_eq!(store.settings().away_message, "line one");
    assert_eq!(store.settings().here_nick, "mk");

    let reloaded = SettingsStore::load(root.path()).expect("reloading failed");

    assert_eq!(reloaded.settings(), store.settings());
    assert_eq!(
        fs::read_to_string(root.path().join("away_msg")).unwrap(),
        "line one\n"
    );
}
