//! Capabilities the reconciler depends on, and the context bundling them
//!
//! Each trait is a thin seam over an external control plane: the MySQL engine,
//! the Juju relation transport, cluster membership, name resolution and the
//! on-disk credential store. Production implementations live in
//! [`crate::resources`] and [`crate::hookenv`].

use std::net::IpAddr;

use crate::config::{RELATION_NAME, Settings};
use crate::controller::error::Result;
use crate::controller::request::RelationSettings;
use crate::hookenv::HookEnv;
use crate::resources::dns::SystemResolver;
use crate::resources::secret::FileCredentialStore;
use crate::resources::sql::MysqlClient;

/// Database existence and grant primitives.
pub trait DatabaseEngine {
    async fn database_exists(&self, database: &str) -> Result<bool>;

    async fn create_database(&self, database: &str) -> Result<()>;

    async fn grant_exists(&self, database: &str, username: &str, address: &str) -> Result<bool>;

    async fn create_grant(
        &self,
        database: &str,
        username: &str,
        address: &str,
        password: &str,
    ) -> Result<()>;
}

/// Key-value exchange with the remote side of a relation.
pub trait RelationTransport {
    /// Settings the remote unit set on the relation that triggered this hook.
    async fn read_settings(&self) -> Result<RelationSettings>;

    /// Set keys on the local side of the triggering relation.
    async fn publish(&self, settings: &RelationSettings) -> Result<()>;

    async fn relation_ids(&self, relation_name: &str) -> Result<Vec<String>>;

    async fn related_units(&self, relation_id: &str) -> Result<Vec<String>>;

    /// The `private-address` a related unit advertises, if it has set one yet.
    async fn unit_address(&self, relation_id: &str, unit: &str) -> Result<Option<String>>;
}

/// Leadership and clustering state of the local service.
pub trait ClusterState {
    async fn is_eligible_leader(&self, resource: &str) -> Result<bool>;

    async fn is_clustered(&self) -> Result<bool>;

    /// Floating address of the cluster.
    async fn virtual_address(&self) -> Result<String>;

    /// Private address of the local unit.
    async fn local_address(&self) -> Result<String>;
}

/// Forward name resolution.
pub trait NameResolver {
    async fn resolve(&self, hostname: &str) -> Result<IpAddr>;
}

/// Per-username password persistence.
pub trait CredentialStore {
    /// Return the stored password for `username`, generating and durably
    /// storing a new one if none exists. Never rotates an existing password.
    async fn load_or_create(&self, username: &str) -> Result<String>;
}

/// Everything a hook invocation needs
pub struct Context<D, R, C, N, S> {
    pub database: D,
    pub relation: R,
    pub cluster: C,
    pub resolver: N,
    pub credentials: S,
    /// Relation whose units are checked for allowed access
    pub relation_name: String,
    /// Cluster resource whose holder is the leader
    pub leader_resource: String,
}

impl<D, R, C, N, S> Context<D, R, C, N, S> {
    pub fn new(
        database: D,
        relation: R,
        cluster: C,
        resolver: N,
        credentials: S,
        leader_resource: impl Into<String>,
    ) -> Self {
        Self {
            database,
            relation,
            cluster,
            resolver,
            credentials,
            relation_name: RELATION_NAME.to_string(),
            leader_resource: leader_resource.into(),
        }
    }
}

/// Context wired to the real hook tools, MySQL client and filesystem
pub type HookContext =
    Context<MysqlClient, HookEnv, HookEnv, SystemResolver, FileCredentialStore>;

impl HookContext {
    pub fn from_settings(settings: &Settings) -> Self {
        let hookenv = HookEnv::new(settings.unit_name.clone());
        Context::new(
            MysqlClient::new(&settings.mysql_bin, &settings.root_password_file),
            hookenv.clone(),
            hookenv,
            SystemResolver,
            FileCredentialStore::new(&settings.secret_base),
            settings.leader_resource.clone(),
        )
    }
}
