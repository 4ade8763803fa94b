//! Comment preservation through a full store write cycle.

use std::fs;

use strata::Store;

use crate::helpers::{scratch_dir, write_file};

#[test]
fn test_header_body_footer_survive_a_set() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "# config\na: 1\n# end\n");

    let store = Store::open(&path).unwrap();
    store.set("a", 2).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# config\na: 2\n# end\n"
    );
}

#[test]
fn test_inline_comment_kept_on_unchanged_line() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "a: 1 # stays\nb: 2 # goes\n");

    let store = Store::open(&path).unwrap();
    store.set("b", 3).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "a: 1 # stays\nb: 3\n"
    );
}

#[test]
fn test_comment_block_above_key_survives() {
    let dir = scratch_dir();
    let path = write_file(
        &dir,
        "config.strata",
        "a: 1\n\n# section about b\nb: 2\n",
    );

    let store = Store::open(&path).unwrap();
    store.set("a", 9).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "a: 9\n\n# section about b\nb: 2\n"
    );
}

#[test]
fn test_new_keys_are_appended_inside_footer() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "# head\na: 1\n# tail\n");

    let store = Store::open(&path).unwrap();
    store.set("b", 2).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# head\na: 1\nb: 2\n# tail\n"
    );
}

#[test]
fn test_comments_dropped_when_preservation_disabled() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "# config\na: 1\n");

    let store = Store::builder(&path).preserve_comments(false).open().unwrap();
    store.set("a", 2).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a: 2\n");
}

#[test]
fn test_crlf_files_stay_crlf() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "# h\r\na: 1\r\n");

    let store = Store::open(&path).unwrap();
    store.set("a", 2).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "# h\r\na: 2\r\n");
}

#[test]
fn test_header_accessors() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.strata", "# old header\na: 1\n");

    let store = Store::open(&path).unwrap();
    assert_eq!(store.header().unwrap(), vec!["# old header".to_string()]);

    store
        .set_header(&["# new header".to_string(), "# second line".to_string()])
        .unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# new header\n# second line\na: 1\n"
    );

    // data still readable afterwards
    assert_eq!(store.get_int("a").unwrap(), 1);
}

#[test]
fn test_comment_preservation_in_toml() {
    let dir = scratch_dir();
    let path = write_file(&dir, "config.toml", "# deploy settings\nport = 1\n");

    let store = Store::open(&path).unwrap();
    store.set("port", 2).unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("# deploy settings\n"), "header kept: {raw}");
    assert!(raw.contains("port = 2"));
}
