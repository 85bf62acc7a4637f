use std::fs;

use figment::providers::Serialized;
use figment::Figment;
use tempfile::tempdir;
use treecmp::cli::{CompareArgs, OutputFormat};
use treecmp::config::{Config, RunConfig};
use treecmp::output::OutputTarget;
use treecmp::roots::LabelStyle;
use treecmp::scanner::HashAlgorithm;

use crate::{clear_env, ENV_MUTEX};

#[test]
fn test_config_load_defaults() {
    // Defaults only, no environment
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.extensions, vec![".py"]);
    assert_eq!(config.format, OutputFormat::Csv);
    assert_eq!(config.labels, LabelStyle::Path);
    assert_eq!(config.algorithm, HashAlgorithm::Sha256);
    assert_eq!(config.fingerprint_width, 12);
    assert_eq!(config.io_threads, 4);
    assert!(!config.show_differences);
}

#[test]
fn test_missing_file_gives_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_toml() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
extensions = [".py", ".pyi"]
format = "json"
labels = "ordinal"
algorithm = "blake3"
io_threads = 2
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();

    assert_eq!(config.extensions, vec![".py", ".pyi"]);
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.labels, LabelStyle::Ordinal);
    assert_eq!(config.algorithm, HashAlgorithm::Blake3);
    assert_eq!(config.io_threads, 2);
    // Untouched keys keep their defaults
    assert_eq!(config.fingerprint_width, 12);
}

#[test]
fn test_env_overrides_file_and_cli_overrides_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 2\nfingerprint_width = 8\nformat = \"json\"\n").unwrap();

    std::env::set_var("TREECMP_IO_THREADS", "16");
    std::env::set_var("TREECMP_FINGERPRINT_WIDTH", "20");
    let mut config = Config::load_from_path(&path).unwrap();
    clear_env();

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.fingerprint_width, 20);
    assert_eq!(config.format, OutputFormat::Json);

    let args = CompareArgs {
        fingerprint_width: Some(6),
        format: Some(OutputFormat::Csv),
        ..CompareArgs::default()
    };
    config.merge_compare_args(&args);

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.fingerprint_width, 6);
    assert_eq!(config.format, OutputFormat::Csv);
}

#[test]
fn test_invalid_value_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = \"many\"\n").unwrap();

    assert!(Config::load_from_path(&path).is_err());
}

#[test]
fn test_invalid_env_value_is_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();

    std::env::set_var("TREECMP_ALGORITHM", "md5");
    let result = Config::load(Some(&dir.path().join("absent.toml")));
    clear_env();

    assert!(result.is_err());
}

#[test]
fn test_run_config_from_merged_settings() {
    let config = Config {
        extensions: vec!["*.rs".into(), ".rs".into()],
        out: Some("-".into()),
        fingerprint_width: 500,
        ..Config::default()
    };

    let run = RunConfig::new(Vec::new(), &config).unwrap();

    assert_eq!(run.target, OutputTarget::Stdout);
    assert_eq!(run.fingerprint_width, 64);
    assert_eq!(run.compare.walker_config.extensions, vec![".rs"]);
}

#[test]
fn test_to_toml_roundtrips_through_load() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env();
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = Config {
        extensions: vec![".go".into()],
        labels: LabelStyle::Ordinal,
        normalize_unicode: true,
        ..Config::default()
    };
    fs::write(&path, config.to_toml().unwrap()).unwrap();

    assert_eq!(Config::load_from_path(&path).unwrap(), config);
}
