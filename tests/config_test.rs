//! Tests for client configuration loading.

use bughouse::{BankAuthority, ClientConfig};
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_defaults() {
    let config = ClientConfig::default();
    assert_eq!(config.server_url(), "ws://127.0.0.1:8765");
    assert_eq!(config.room(), &None);
    assert_eq!(config.log_file(), &PathBuf::from("bughouse_client.log"));
    assert_eq!(config.log_filter(), "info");
    assert_eq!(config.bank_authority(), &BankAuthority::Event);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "room = \"club\"").expect("write");
    writeln!(file, "bank_authority = \"capture\"").expect("write");

    let config = ClientConfig::from_file(file.path()).expect("loads");
    assert_eq!(config.room().as_deref(), Some("club"));
    assert_eq!(config.bank_authority(), &BankAuthority::Capture);
    assert_eq!(config.server_url(), "ws://127.0.0.1:8765");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config =
        ClientConfig::load_or_default(dir.path().join("absent.toml")).expect("defaults");
    assert_eq!(config, ClientConfig::default());
}

#[test]
fn test_unreadable_path_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = ClientConfig::from_file(dir.path().join("absent.toml")).expect_err("no file");
    assert!(error.message.contains("Failed to read config file"));
}

#[test]
fn test_invalid_values_rejected() {
    let error = ClientConfig::from_toml("bank_authority = \"both\"").expect_err("bad authority");
    assert!(error.message.contains("Failed to parse config"));

    let error = ClientConfig::from_toml("server_url = \"http://example.com\"").expect_err("bad url");
    assert!(error.message.contains("ws://"));

    assert!(ClientConfig::from_toml("room = \"  \"").is_err());
}

#[test]
fn test_overrides() {
    let config = ClientConfig::default()
        .with_server_url("ws://10.0.0.2:9000")
        .with_room("finals")
        .with_bank_authority(BankAuthority::Capture);
    assert_eq!(config.server_url(), "ws://10.0.0.2:9000");
    assert_eq!(config.room().as_deref(), Some("finals"));
    assert_eq!(config.bank_authority(), &BankAuthority::Capture);
}
