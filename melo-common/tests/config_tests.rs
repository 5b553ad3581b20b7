//! Integration tests for config file discovery and loading
//!
//! Tests that manipulate environment variables are marked with #[serial]
//! so they run sequentially, not in parallel.

use melo_common::config::{load_toml_config, resolve_config_path, LoggingConfig};
use melo_common::Error;
use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
struct ServiceToml {
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_env_var_used_when_no_cli_arg() {
    env::set_var("MELO_TEST_CONFIG", "/tmp/from-env.toml");

    let path = resolve_config_path(None, "MELO_TEST_CONFIG", "does-not-exist.toml");
    assert_eq!(path, Some(PathBuf::from("/tmp/from-env.toml")));

    env::remove_var("MELO_TEST_CONFIG");
}

#[test]
#[serial]
fn test_cli_arg_beats_env_var() {
    env::set_var("MELO_TEST_CONFIG", "/tmp/from-env.toml");

    let cli = PathBuf::from("/tmp/from-cli.toml");
    let path = resolve_config_path(Some(&cli), "MELO_TEST_CONFIG", "does-not-exist.toml");
    assert_eq!(path, Some(cli));

    env::remove_var("MELO_TEST_CONFIG");
}

#[test]
#[serial]
fn test_blank_env_var_is_ignored() {
    env::set_var("MELO_TEST_CONFIG", "   ");

    let path = resolve_config_path(None, "MELO_TEST_CONFIG", "melo-test-never-installed.toml");
    assert_eq!(path, None);

    env::remove_var("MELO_TEST_CONFIG");
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    let config: ServiceToml = load_toml_config(Some(&missing)).unwrap();
    assert_eq!(config.port, None);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_no_path_falls_back_to_defaults() {
    let config: ServiceToml = load_toml_config(None).unwrap();
    assert_eq!(config.port, None);
}

#[test]
fn test_load_valid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 6000\n\n[logging]\nlevel = \"debug\"").unwrap();

    let config: ServiceToml = load_toml_config(Some(file.path())).unwrap();
    assert_eq!(config.port, Some(6000));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = \"not a number\"").unwrap();

    let result: melo_common::Result<ServiceToml> = load_toml_config(Some(file.path()));
    match result {
        Err(Error::Config(msg)) => assert!(msg.contains("Parse TOML failed")),
        other => panic!("Expected config error, got {:?}", other),
    }
}
