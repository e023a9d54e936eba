use docket_db::{DbConfig, DbError};
use docket_types::IdGenerator;
use std::io::Write;

#[test]
fn defaults() {
    let config = DbConfig::default();
    assert_eq!(config.db_name, "docket");
    assert_eq!(config.id_digits, IdGenerator::DEFAULT_DIGITS);
    assert_eq!(config.id_generator(), IdGenerator::new());
}

#[test]
fn parses_toml() {
    let config = DbConfig::from_toml_str("db_name = \"app\"\nid_digits = 16\n").unwrap();
    assert_eq!(config.db_name, "app");
    assert_eq!(config.id_digits, 16);
}

#[test]
fn omitted_keys_take_defaults() {
    let config = DbConfig::from_toml_str("db_name = \"only\"").unwrap();
    assert_eq!(config.id_digits, IdGenerator::DEFAULT_DIGITS);
}

#[test]
fn rejects_malformed_toml() {
    assert!(matches!(
        DbConfig::from_toml_str("db_name = "),
        Err(DbError::ConfigParse(_))
    ));
}

#[test]
fn rejects_unusable_values() {
    assert!(matches!(
        DbConfig::from_toml_str("db_name = \"  \""),
        Err(DbError::InvalidConfig(_))
    ));
    assert!(matches!(
        DbConfig::from_toml_str("id_digits = 0"),
        Err(DbError::InvalidConfig(_))
    ));
}

#[test]
fn load_from_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "db_name = \"from_file\"").unwrap();

    let config = DbConfig::load_from(file.path());
    assert_eq!(config.db_name, "from_file");
}

#[test]
fn load_from_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = DbConfig::load_from(&dir.path().join("absent.toml"));
    assert_eq!(config, DbConfig::default());
}

#[test]
fn load_from_invalid_file_uses_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "this is [not toml").unwrap();

    assert_eq!(DbConfig::load_from(file.path()), DbConfig::default());
}
