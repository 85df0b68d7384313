use serial_test::serial;
use std::fs;
use std::path::{Path, PathBuf};

use tracker_conf::config::{ReservedSpace, StoreLookup};
use tracker_conf::{ConfigError, ErrorKind, TrackerState};

fn write_conf(dir: &Path, extra: &str) -> PathBuf {
    let conf_file = dir.join("tracker.conf");
    let content = format!(
        "# tracker config\n\
         disabled=false\n\
         base_path={}\n\
         port = 22122\n\
         work_threads = 8\n\
         {}\n",
        dir.display(),
        extra
    );
    fs::write(&conf_file, content).unwrap();
    conf_file
}

#[test]
#[serial]
fn test_load_full_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("storage_ids.conf"),
        "id1 g1 10.0.0.1\n# comment\n\nid2 g1 10.0.0.2\nid3 g2 10.0.0.1\n",
    )
    .unwrap();
    let conf_file = write_conf(
        dir.path(),
        "store_lookup = 1\n\
         store_group = g1\n\
         reserved_storage_space = 10%\n\
         use_trunk_file = true\n\
         slot_min_size = 100000\n\
         trunk_create_file_time_base = 01:30\n\
         use_storage_id = true\n\
         storage_ids_filename = storage_ids.conf\n",
    );

    let state = TrackerState::load(&conf_file).expect("Load failed");
    let config = &state.config;

    assert_eq!(config.port, 22122);
    assert_eq!(config.work_threads, 8);
    assert_eq!(config.groups.store_lookup, StoreLookup::SpecifiedGroup);
    assert_eq!(config.groups.store_group, "g1");
    assert_eq!(config.reserved_space, ReservedSpace::RatioPercent(10.0));
    assert!(config.trunk.enabled);
    assert_eq!(config.trunk.slot_min_size, 64 * 1024);
    assert_eq!(config.trunk.slot_max_size, config.trunk.trunk_file_size / 2);
    assert_eq!(config.trunk.create_file_time_base.to_string(), "01:30");

    let keys: Vec<(String, String)> = state
        .storage_ids
        .iter()
        .map(|r| (r.group_name.clone(), r.ip_addr.to_string()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("g1".to_string(), "10.0.0.1".to_string()),
            ("g1".to_string(), "10.0.0.2".to_string()),
            ("g2".to_string(), "10.0.0.1".to_string()),
        ]
    );
    assert_eq!(state.storage_id_for("g1", "10.0.0.2").unwrap().id, "id2");
    assert!(state.storage_id_for("g3", "10.0.0.1").is_none());

    let yaml = serde_yaml::to_string(&*state.config).unwrap();
    assert!(yaml.contains("store_group: g1"));
}

#[test]
#[serial]
fn test_single_token_line_fails_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("ids.conf"), "id1 g1 10.0.0.1\nid2 g1 10.0.0.2\nlonely\n").unwrap();
    let conf_file = write_conf(dir.path(), "use_storage_id = true\nstorage_ids_filename = ids.conf\n");

    let err = TrackerState::load(&conf_file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
    match err {
        ConfigError::MalformedIdLine { line_no, line, .. } => {
            assert_eq!(line_no, 3);
            assert_eq!(line, "lonely");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
#[serial]
fn test_absolute_storage_ids_path() {
    let conf_dir = tempfile::tempdir().unwrap();
    let ids_dir = tempfile::tempdir().unwrap();
    let ids_file = ids_dir.path().join("storage_ids.conf");
    fs::write(&ids_file, "100001 group1 127.0.0.1\n").unwrap();

    let conf_file = write_conf(
        conf_dir.path(),
        &format!("use_storage_id = true\nstorage_ids_filename = {}\n", ids_file.display()),
    );
    let state = TrackerState::load(&conf_file).unwrap();
    assert_eq!(state.storage_ids.len(), 1);
    assert_eq!(state.storage_ids.find_by_id("100001").unwrap().group_name, "group1");
}

#[test]
#[serial]
fn test_storage_ids_ignored_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let conf_file = write_conf(dir.path(), "storage_ids_filename = missing.conf\n");

    let state = TrackerState::load(&conf_file).unwrap();
    assert!(!state.config.use_storage_id);
    assert!(state.storage_ids.is_empty());
    assert!(state.storage_id_for("group1", "10.0.0.1").is_none());
}

#[test]
#[serial]
fn test_trunk_size_clamp_and_slot_max_error() {
    let dir = tempfile::tempdir().unwrap();
    let conf_file = write_conf(dir.path(), "trunk_file_size = 2MB\n");
    let state = TrackerState::load(&conf_file).unwrap();
    assert_eq!(state.config.trunk.trunk_file_size, 4 * 1024 * 1024);

    let conf_file = write_conf(dir.path(), "slot_min_size = 1KB\nslot_max_size = 512\n");
    let err = TrackerState::load(&conf_file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
#[serial]
fn test_store_group_errors() {
    let dir = tempfile::tempdir().unwrap();

    let conf_file = write_conf(dir.path(), "store_lookup = 1\n");
    assert_eq!(TrackerState::load(&conf_file).unwrap_err().kind(), ErrorKind::NotFound);

    let conf_file = write_conf(dir.path(), "store_lookup = 1\nstore_group =\n");
    assert_eq!(TrackerState::load(&conf_file).unwrap_err().kind(), ErrorKind::InvalidValue);

    let conf_file = write_conf(dir.path(), "store_lookup = 1\nstore_group = group/1\n");
    assert_eq!(TrackerState::load(&conf_file).unwrap_err().kind(), ErrorKind::InvalidValue);
}

#[test]
fn test_missing_conf_file() {
    let err = TrackerState::load("/nonexistent/tracker.conf").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
