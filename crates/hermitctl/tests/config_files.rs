//! Config file loading and CLI overrides

use clap::Parser;
use hermitctl::cli::{Cli, Commands};
use hermitctl::config::{CaptureSource, HermitConfig};
use hermitctl::interaction::PayloadFormat;
use std::time::Duration;
use tempfile::TempDir;

const CONFIG: &str = r#"
[display]
capture_width = "320px"

[capture]
source = "file"
file = "/run/hermit/last.txt"
poll_interval_ms = 50

[command]
command = "sign-psbt"
format = "hex"
"#;

#[test]
fn test_explicit_file_is_loaded() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();

    let config = HermitConfig::load(Some(&path)).unwrap();
    assert_eq!(config.display.capture_width, "320px");
    assert_eq!(config.capture.source, CaptureSource::File);
    assert_eq!(config.capture.poll_interval(), Duration::from_millis(50));
    assert_eq!(config.command.command, "sign-psbt");
    assert_eq!(config.command.format, PayloadFormat::Hex);
    // Unset keys keep their defaults
    assert_eq!(config.command.mode, "wallet");
    assert_eq!(config.session_options().start_label, "Scan");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    let err = HermitConfig::load(Some(&path)).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read"));
}

#[test]
fn test_malformed_file_names_the_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, "[capture\nsource = ").unwrap();

    let err = HermitConfig::load_from(&path).unwrap_err();
    assert!(format!("{}", err).contains("config.toml"));
}

#[test]
fn test_written_config_loads_back() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");

    let mut config = HermitConfig::default();
    config.command.command = "display-xpub".to_string();
    config.command.format = PayloadFormat::Json;
    std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

    assert_eq!(HermitConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_flags_override_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    std::fs::write(&path, CONFIG).unwrap();
    let mut config = HermitConfig::load(Some(&path)).unwrap();

    let cli = Cli::try_parse_from([
        "hermitctl",
        "scan",
        "--command",
        "display-xpub",
        "--source",
        "process",
        "--decoder",
        "zbarcam --raw",
    ])
    .unwrap();
    let Commands::Scan(args) = cli.command else {
        panic!("expected scan");
    };
    args.apply(&mut config);

    assert_eq!(config.command.command, "display-xpub");
    assert_eq!(config.capture.source, CaptureSource::Process);
    assert_eq!(config.capture.decoder, "zbarcam --raw");
    // Not overridden
    assert_eq!(config.command.format, PayloadFormat::Hex);
}
