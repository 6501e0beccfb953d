//! Config unit tests

use crate::util::config::{load_config, load_config_from, parse_config, ConfigError, RuntimeConfig};
use crate::util::logger::LogLevel;
use std::io::Write;

#[test]
fn test_defaults() {
    let config = RuntimeConfig::default();
    assert_eq!(config.log.level, "info");
    assert_eq!(config.log_level().unwrap(), LogLevel::Info);
    assert_eq!(config.gc.retained_regions, 4);
}

#[test]
fn test_empty_document_is_default() {
    assert_eq!(parse_config("").unwrap(), RuntimeConfig::default());
}

#[test]
fn test_partial_sections() {
    let config = parse_config(
        r#"
[gc]
max_heap_size = 1048576

[log]
level = "debug"
"#,
    )
    .unwrap();
    assert_eq!(config.gc.max_heap_size, 1024 * 1024);
    assert_eq!(config.gc.region_size, 64 * 1024);
    assert_eq!(config.log_level().unwrap(), LogLevel::Debug);
}

#[test]
fn test_invalid_level() {
    let config = parse_config("[log]\nlevel = \"loud\"").unwrap();
    assert!(matches!(
        config.log_level(),
        Err(ConfigError::InvalidLogLevel(level)) if level == "loud"
    ));
}

#[test]
fn test_malformed_toml() {
    assert!(matches!(
        parse_config("[gc\nregion_size = "),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[gc]\nretained_regions = 9").unwrap();

    let config = load_config_from(file.path()).unwrap();
    assert_eq!(config.gc.retained_regions, 9);
}

#[test]
fn test_missing_implicit_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("hostrt.toml")).unwrap();
    assert_eq!(config, RuntimeConfig::default());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    assert!(matches!(load_config(Some(&missing)), Err(ConfigError::Io(_))));
}
