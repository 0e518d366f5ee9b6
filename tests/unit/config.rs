//! Unit tests for configuration loading

use std::collections::HashMap;
use std::path::PathBuf;

use shared_db_reconciler::Error;
use shared_db_reconciler::config::{
    DEFAULT_LEADER_RESOURCE, DEFAULT_MYSQL_BIN, DEFAULT_ROOT_PASSWORD_FILE, DEFAULT_SECRET_BASE,
    ENV_LEADER_RESOURCE, ENV_SECRET_BASE, ENV_UNIT_NAME, Settings,
};

fn load(pairs: &[(&str, &str)]) -> shared_db_reconciler::Result<Settings> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Settings::from_lookup(|key| env.get(key).cloned())
}

#[test]
fn test_defaults() {
    let settings = load(&[(ENV_UNIT_NAME, "mysql/0")]).unwrap();

    assert_eq!(settings.unit_name, "mysql/0");
    assert_eq!(settings.secret_base, PathBuf::from(DEFAULT_SECRET_BASE));
    assert_eq!(
        settings.root_password_file,
        PathBuf::from(DEFAULT_ROOT_PASSWORD_FILE)
    );
    assert_eq!(settings.mysql_bin, DEFAULT_MYSQL_BIN);
    assert_eq!(settings.leader_resource, DEFAULT_LEADER_RESOURCE);
}

#[test]
fn test_overrides() {
    let settings = load(&[
        (ENV_UNIT_NAME, "mysql/2"),
        (ENV_SECRET_BASE, "/srv/secrets/db"),
        (ENV_LEADER_RESOURCE, "res_percona_vip"),
    ])
    .unwrap();

    assert_eq!(settings.secret_base, PathBuf::from("/srv/secrets/db"));
    assert_eq!(settings.leader_resource, "res_percona_vip");
}

#[test]
fn test_missing_unit_name() {
    let err = load(&[]).unwrap_err();
    assert!(matches!(err, Error::ConfigError(_)));
}

#[test]
fn test_empty_value_counts_as_unset() {
    let settings = load(&[(ENV_UNIT_NAME, "mysql/0"), (ENV_SECRET_BASE, "")]).unwrap();
    assert_eq!(settings.secret_base, PathBuf::from(DEFAULT_SECRET_BASE));

    assert!(load(&[(ENV_UNIT_NAME, "")]).is_err());
}
