//! Store construction, reload policy and typed accessor tests.

use std::{fs, thread, time::Duration};

use strata::{Document, Format, ReloadMode, Store, Value, constants::RELOAD_CHECK_INTERVAL};

use crate::helpers::{open_store, scratch_dir, write_file};

// ===== CONSTRUCTION =====

#[test]
fn test_missing_file_creates_empty_document_immediately() {
    let dir = scratch_dir();
    let path = dir.path().join("fresh.strata");

    let store = Store::open(&path).unwrap();
    assert!(path.exists(), "backing file persisted at open");
    assert!(store.document().is_empty());
}

#[test]
fn test_seed_written_verbatim_when_file_missing() {
    let dir = scratch_dir();
    let path = dir.path().join("seeded.strata");

    let store = Store::builder(&path)
        .seed(&b"# seeded defaults\nport: 9000\n"[..])
        .open()
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# seeded defaults\nport: 9000\n"
    );
    assert_eq!(store.get_int("port").unwrap(), 9000);
}

#[test]
fn test_seed_ignored_when_file_exists() {
    let dir = scratch_dir();
    let path = write_file(&dir, "existing.strata", "port: 1\n");

    let store = Store::builder(&path)
        .seed(&b"port: 2\n"[..])
        .open()
        .unwrap();
    assert_eq!(store.get_int("port").unwrap(), 1);
}

#[test]
fn test_format_inferred_from_extension() {
    let dir = scratch_dir();
    assert_eq!(
        open_store(&dir, "a.json").format(),
        Format::Json,
        "json inferred"
    );
    assert_eq!(open_store(&dir, "b.toml").format(), Format::Toml);
    assert_eq!(open_store(&dir, "c.yml").format(), Format::Strata);
}

#[test]
fn test_extension_appended_when_missing() {
    let dir = scratch_dir();
    let store = Store::builder(dir.path().join("bare"))
        .format(Format::Json)
        .open()
        .unwrap();
    assert_eq!(store.path().extension().unwrap(), "json");
}

#[test]
fn test_parent_directories_created() {
    let dir = scratch_dir();
    let path = dir.path().join("deeply/nested/config.strata");
    let store = Store::open(&path).unwrap();
    store.set("a", 1).unwrap();
    assert!(path.exists());
}

#[test]
fn test_unparsable_file_is_fatal_at_open() {
    let dir = scratch_dir();
    let path = write_file(&dir, "broken.strata", "a: 1\na: 2\n");
    let err = Store::open(&path).unwrap_err();
    assert!(err.is_parse_error());
}

// ===== BASIC READ/WRITE =====

#[test]
fn test_set_get_remove_roundtrip() {
    let dir = scratch_dir();
    let store = open_store(&dir, "rw.strata");

    store.set("server.host", "localhost").unwrap();
    store.set("server.port", 8080).unwrap();

    assert!(store.contains_key("server.port").unwrap());
    assert_eq!(store.get_string("server.host").unwrap(), "localhost");
    assert_eq!(store.get_int("server.port").unwrap(), 8080);

    assert_eq!(
        store.remove("server.port").unwrap(),
        Some(Value::Int(8080))
    );
    assert!(!store.contains_key("server.port").unwrap());

    // removing an absent key is a quiet no-op
    assert_eq!(store.remove("server.port").unwrap(), None);
}

#[test]
fn test_writes_survive_reopen() {
    let dir = scratch_dir();
    let path = dir.path().join("persist.strata");

    {
        let store = Store::open(&path).unwrap();
        store.set("a.b", 1).unwrap();
        store.set("list", vec!["x", "y"]).unwrap();
    }

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.get_int("a.b").unwrap(), 1);
    assert_eq!(
        reopened.get_string_list("list").unwrap(),
        vec!["x".to_string(), "y".to_string()]
    );
}

#[test]
fn test_set_through_scalar_is_structural_conflict() {
    let dir = scratch_dir();
    let store = open_store(&dir, "conflict.strata");

    store.set("a", 1).unwrap();
    let err = store.set("a.b", 2).unwrap_err();
    assert!(err.is_structural_conflict());

    // neither memory nor disk changed
    assert_eq!(store.get_int("a").unwrap(), 1);
    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        "a: 1\n"
    );
}

#[test]
fn test_malformed_key_is_rejected() {
    let dir = scratch_dir();
    let store = open_store(&dir, "badkey.strata");
    assert!(store.set("a..b", 1).unwrap_err().is_invalid_key());
    assert!(store.get_value("").unwrap_err().is_invalid_key());
}

#[test]
fn test_keys_enumeration() {
    let dir = scratch_dir();
    let store = open_store(&dir, "keys.strata");
    store.set("a", 1).unwrap();
    store.set("b.c", 2).unwrap();
    store.set("b.d", 3).unwrap();

    let all: Vec<String> = store.keys(true).into_iter().map(|k| k.to_string()).collect();
    assert_eq!(all, vec!["a", "b", "b.c", "b.d"]);

    let top: Vec<String> = store.keys(false).into_iter().map(|k| k.to_string()).collect();
    assert_eq!(top, vec!["a", "b"]);

    let under: Vec<String> = store
        .keys_under("b", false)
        .unwrap()
        .into_iter()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(under, vec!["b.c", "b.d"]);
}

#[test]
fn test_merge_from_persists() {
    let dir = scratch_dir();
    let path = dir.path().join("merge.strata");
    let store = Store::open(&path).unwrap();
    store.set("kept", 1).unwrap();

    let incoming = Document::new().with("kept", 99).with("added", 2);
    store.merge_from(&incoming, false).unwrap();

    assert_eq!(store.get_int("kept").unwrap(), 1);
    assert_eq!(store.get_int("added").unwrap(), 2);

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.get_int("added").unwrap(), 2);
}

// ===== TYPED ACCESSORS =====

#[test]
fn test_zero_defaults_for_missing_keys() {
    let dir = scratch_dir();
    let store = open_store(&dir, "defaults.strata");

    assert_eq!(store.get_string("missing").unwrap(), "");
    assert_eq!(store.get_int("missing").unwrap(), 0);
    assert_eq!(store.get_float("missing").unwrap(), 0.0);
    assert!(!store.get_bool("missing").unwrap());
    assert!(store.get_string_list("missing").unwrap().is_empty());
}

#[test]
fn test_textual_coercions() {
    let dir = scratch_dir();
    let store = open_store(&dir, "coerce.strata");
    store.set("port", "8080").unwrap();
    store.set("ratio", "0.5").unwrap();
    store.set("on", "TRUE").unwrap();

    assert_eq!(store.get_int("port").unwrap(), 8080);
    assert_eq!(store.get_float("ratio").unwrap(), 0.5);
    assert!(store.get_bool("on").unwrap());

    // failed coercions fall back silently
    store.set("word", "zebra").unwrap();
    assert_eq!(store.get_int("word").unwrap(), 0);
}

#[test]
fn test_strict_mode_raises_on_bad_coercion() {
    let dir = scratch_dir();
    let store = open_store(&dir, "strict.strata");
    store.set("word", "zebra").unwrap();

    assert_eq!(store.get_strict::<String>("word").unwrap().as_deref(), Some("zebra"));
    assert_eq!(store.get_strict::<i64>("missing").unwrap(), None);
    assert!(store.get_strict::<i64>("word").unwrap_err().is_coercion_error());
}

#[test]
fn test_list_accessors_skip_uncoercible_elements() {
    let dir = scratch_dir();
    let store = open_store(&dir, "lists.strata");
    store
        .set(
            "mixed",
            vec![Value::Int(1), Value::Text("2".into()), Value::Text("x".into())],
        )
        .unwrap();

    assert_eq!(store.get_int_list("mixed").unwrap(), vec![1, 2]);
    // non-list value yields an empty list
    store.set("scalar", 5).unwrap();
    assert!(store.get_int_list("scalar").unwrap().is_empty());
}

#[test]
fn test_get_or_set_default_persists_the_miss() {
    let dir = scratch_dir();
    let path = dir.path().join("getset.strata");
    let store = Store::open(&path).unwrap();

    assert_eq!(store.get_or_set_default("x.y", 5).unwrap(), 5);
    assert!(store.contains_key("x.y").unwrap());

    // hit path returns the stored value, not the default
    assert_eq!(store.get_or_set_default("x.y", 9).unwrap(), 5);

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.get_int("x.y").unwrap(), 5);
}

#[test]
fn test_set_default_only_writes_absent_keys() {
    let dir = scratch_dir();
    let store = open_store(&dir, "setdef.strata");
    store.set("a", 1).unwrap();

    store.set_default("a", 2).unwrap();
    store.set_default("b", 3).unwrap();

    assert_eq!(store.get_int("a").unwrap(), 1);
    assert_eq!(store.get_int("b").unwrap(), 3);
}

// ===== RELOAD POLICY =====

#[test]
fn test_manual_mode_ignores_disk_until_reload() {
    let dir = scratch_dir();
    let path = write_file(&dir, "manual.strata", "a: 1\n");
    let store = Store::builder(&path)
        .reload(ReloadMode::Manual)
        .open()
        .unwrap();

    fs::write(&path, "a: 22\n").unwrap();
    assert_eq!(store.get_int("a").unwrap(), 1, "stale until explicit reload");

    store.reload().unwrap();
    assert_eq!(store.get_int("a").unwrap(), 22);
}

#[test]
fn test_automatic_mode_sees_outside_edits() {
    let dir = scratch_dir();
    let path = write_file(&dir, "auto.strata", "a: 1\n");
    let store = Store::builder(&path)
        .reload(ReloadMode::Automatic)
        .open()
        .unwrap();

    assert_eq!(store.get_int("a").unwrap(), 1);
    fs::write(&path, "a: 22\n").unwrap();
    assert_eq!(store.get_int("a").unwrap(), 22);
}

#[test]
fn test_intelligent_mode_rate_limits_signature_checks() {
    let dir = scratch_dir();
    let path = write_file(&dir, "smart.strata", "a: 1\n");
    let store = Store::builder(&path)
        .reload(ReloadMode::Intelligent)
        .open()
        .unwrap();

    // within the interval after open, accesses skip the signature check
    fs::write(&path, "a: 22\n").unwrap();
    assert_eq!(store.get_int("a").unwrap(), 1);
    assert_eq!(store.get_int("a").unwrap(), 1);

    // once the interval elapses exactly one check runs and picks up the edit
    thread::sleep(RELOAD_CHECK_INTERVAL + Duration::from_millis(100));
    assert_eq!(store.get_int("a").unwrap(), 22);

    // and the very next accesses are throttled again
    fs::write(&path, "a: 333\n").unwrap();
    assert_eq!(store.get_int("a").unwrap(), 22);
}

#[test]
fn test_reload_failure_keeps_last_good_document() {
    let dir = scratch_dir();
    let path = write_file(&dir, "degrade.strata", "a: 1\n");
    let store = Store::builder(&path)
        .reload(ReloadMode::Automatic)
        .open()
        .unwrap();

    // corrupt the file on disk: automatic reload degrades to stale data
    fs::write(&path, "a: 1\na: 1\n").unwrap();
    assert_eq!(store.get_int("a").unwrap(), 1);

    // the explicit reload surfaces the failure instead
    let err = store.reload().unwrap_err();
    assert!(err.is_reload_error());
    assert_eq!(store.get_int("a").unwrap(), 1, "last good document served");
}

#[test]
fn test_deleted_file_keeps_last_good_document() {
    let dir = scratch_dir();
    let path = write_file(&dir, "gone.strata", "a: 1\n");
    let store = Store::builder(&path)
        .reload(ReloadMode::Automatic)
        .open()
        .unwrap();

    fs::remove_file(&path).unwrap();
    assert_eq!(store.get_int("a").unwrap(), 1);

    // the next write recreates the file
    store.set("a", 2).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "a: 2\n");
}

// ===== JSON-BACKED STORE =====

#[test]
fn test_json_store_roundtrip() {
    let dir = scratch_dir();
    let path = dir.path().join("config.json");
    let store = Store::open(&path).unwrap();
    store.set("server.port", 8080).unwrap();
    store.set("tags", vec!["a", "b"]).unwrap();

    let reopened = Store::open(&path).unwrap();
    assert_eq!(reopened.get_int("server.port").unwrap(), 8080);
    assert_eq!(
        reopened.get_string_list("tags").unwrap(),
        vec!["a".to_string(), "b".to_string()]
    );

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.trim_start().starts_with('{'), "file is JSON: {raw}");
}
