//! Integration test: Configuration loading

use market_ingest_bot::PipelineConfig;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_config_loads() {
    let file = write_config(
        r#"
gamma_api_url: "https://gamma.example.com"
database_path: "sqlite://test.db"
log_level: "debug"
"#,
    );

    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.gamma_api_url, "https://gamma.example.com");
    assert_eq!(config.database_path, "sqlite://test.db");
    assert_eq!(config.log_level, "debug");
    assert!(config.patterns_file.is_none());
}

#[test]
fn test_missing_fields_use_defaults() {
    let file = write_config("log_level: \"warn\"\n");

    let config = PipelineConfig::load(file.path()).unwrap();
    assert_eq!(config.gamma_api_url, "https://gamma-api.polymarket.com");
    assert_eq!(config.database_path, "sqlite://market_ingest.db");
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_builtin_patterns_when_no_file_configured() {
    let file = write_config("{}\n");

    let config = PipelineConfig::load(file.path()).unwrap();
    let set = config.pattern_set().unwrap();
    assert!(!set.rules().is_empty());
}

#[test]
fn test_configured_pattern_file_is_loaded() {
    let patterns = write_config(
        r#"
rules:
  - kind: regex
    name: mayor_race
    pattern: "(?i)will\\s+(.+?)\\s+be\\s+the\\s+next\\s+mayor"
"#,
    );

    let config_file = write_config(&format!(
        "patterns_file: \"{}\"\n",
        patterns.path().display()
    ));

    let config = PipelineConfig::load(config_file.path()).unwrap();
    let set = config.pattern_set().unwrap();

    let (rule, entity) = set
        .first_match("Will Jane Doe be the next mayor of Chicago?")
        .unwrap();
    assert_eq!(rule, "mayor_race");
    assert_eq!(entity, "Jane Doe");
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let file = write_config("gamma_api_url: [not: a: string\n");
    assert!(PipelineConfig::load(file.path()).is_err());
}
