//! Runtime configuration
//!
//! Hooks run with no arguments, so everything is taken from the environment
//! Juju sets up for the hook, with overrides for deployments that lay files
//! out differently.

use std::path::PathBuf;

use tracing::debug;

use crate::controller::error::{Error, Result};

/// Relation consumers request databases on
pub const RELATION_NAME: &str = "shared-db";
/// Peer relation between units of this service
pub const PEER_RELATION: &str = "cluster";
/// Relation to the hacluster subordinate
pub const HA_RELATION: &str = "ha";

pub const DEFAULT_LEADER_RESOURCE: &str = "res_mysql_vip";
pub const DEFAULT_SECRET_BASE: &str = "/var/lib/mysql/mysql";
pub const DEFAULT_ROOT_PASSWORD_FILE: &str = "/var/lib/mysql/mysql.passwd";
pub const DEFAULT_MYSQL_BIN: &str = "mysql";

pub const ENV_UNIT_NAME: &str = "JUJU_UNIT_NAME";
pub const ENV_SECRET_BASE: &str = "SHARED_DB_SECRET_BASE";
pub const ENV_ROOT_PASSWORD_FILE: &str = "SHARED_DB_ROOT_PASSWORD_FILE";
pub const ENV_MYSQL_BIN: &str = "SHARED_DB_MYSQL_BIN";
pub const ENV_LEADER_RESOURCE: &str = "SHARED_DB_LEADER_RESOURCE";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Local unit, e.g. `mysql/0`
    pub unit_name: String,
    /// Prefix of per-user secret files
    pub secret_base: PathBuf,
    pub root_password_file: PathBuf,
    pub mysql_bin: String,
    /// Pacemaker resource whose holder leads a clustered service
    pub leader_resource: String,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from any key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let unit_name = get(ENV_UNIT_NAME)
            .ok_or_else(|| Error::ConfigError(format!("{} is not set", ENV_UNIT_NAME)))?;

        let settings = Self {
            unit_name,
            secret_base: get(ENV_SECRET_BASE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRET_BASE)),
            root_password_file: get(ENV_ROOT_PASSWORD_FILE)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_PASSWORD_FILE)),
            mysql_bin: get(ENV_MYSQL_BIN).unwrap_or_else(|| DEFAULT_MYSQL_BIN.to_string()),
            leader_resource: get(ENV_LEADER_RESOURCE)
                .unwrap_or_else(|| DEFAULT_LEADER_RESOURCE.to_string()),
        };

        debug!(?settings, "Loaded settings");
        Ok(settings)
    }
}
