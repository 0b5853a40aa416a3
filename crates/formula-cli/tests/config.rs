//! Config file loading and input handling.

use std::fs;

use rhizome_formula_cli::{evaluate, read_input, Config, ConfigError, OutputFormat};

#[test]
fn test_missing_config_uses_defaults() {
    let config = Config::load(None).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.format, OutputFormat::Text);
    assert_eq!(config.log_filter, None);
}

#[test]
fn test_load_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("formula.toml");
    fs::write(
        &path,
        "log_filter = \"rhizome_formula=debug\"\nformat = \"pretty-json\"\n",
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.log_filter.as_deref(), Some("rhizome_formula=debug"));
    assert_eq!(config.format, OutputFormat::PrettyJson);
    assert_eq!(config.output_format(None), OutputFormat::PrettyJson);
    assert_eq!(config.output_format(Some(OutputFormat::Json)), OutputFormat::Json);
}

#[test]
fn test_partial_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("formula.toml");
    fs::write(&path, "format = \"json\"\n").unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.format, OutputFormat::Json);
    assert_eq!(config.log_filter, None);
}

#[test]
fn test_invalid_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("formula.toml");
    fs::write(&path, "format = \"yaml\"\n").unwrap();
    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Parse { .. })
    ));

    fs::write(&path, "colour = true\n").unwrap();
    assert!(matches!(
        Config::from_file(&path),
        Err(ConfigError::Parse { .. })
    ));

    let missing = temp_dir.path().join("missing.toml");
    let err = Config::from_file(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("missing.toml"));
}

#[test]
fn test_read_input_from_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("sum.formula");
    fs::write(&path, "; running total\n(+ 1 2 3)\n(- 10 4)\n").unwrap();

    let source = read_input(&format!("@{}", path.display())).unwrap();
    assert_eq!(evaluate(&source, OutputFormat::Text).unwrap(), "6\n6");
}
