use std::fs;

use roomgen::{ConfigError, FloorProgress, FloorStateFile, GeneratorConfig, RoomKind};
use tempfile::tempdir;

#[test]
fn config_loads_from_a_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roomgen.toml");
    fs::write(
        &path,
        r#"
grid_width = 8
grid_height = 6
min_rooms = 6
max_rooms = 9

[[rooms]]
kind = "start"
max_per_floor = 1

[[rooms]]
kind = "boss"
max_per_floor = 1
required = true

[[rooms]]
kind = "shop"
max_per_floor = 1
required = true
"#,
    )
    .unwrap();

    let config = GeneratorConfig::load(&path).expect("config should load");

    assert_eq!((config.grid_width, config.grid_height), (8, 6));
    assert!(config.is_required(RoomKind::Shop));
    assert_eq!(config.max_per_floor(RoomKind::Treasure), 0);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let result = GeneratorConfig::load(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn malformed_config_file_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roomgen.toml");
    fs::write(&path, "grid_width = \"wide\"").unwrap();

    assert!(matches!(GeneratorConfig::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn resumed_run_regenerates_the_saved_floor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("floor_state.json");
    let config = GeneratorConfig::default();

    let mut progress = FloorProgress::new(2_024);
    progress.descend();
    let before = progress.generate(&config).expect("generation failed");
    progress.to_file().write_atomic(&path).unwrap();

    let restored = FloorProgress::from_file(&FloorStateFile::load(&path).unwrap());
    let mut restored_progress = restored;
    let after = restored_progress.generate(&config).expect("generation failed");

    assert_eq!(restored.floor(), 2);
    assert!(restored.is_generated());
    assert_eq!(before.fingerprint(), after.fingerprint());
}
