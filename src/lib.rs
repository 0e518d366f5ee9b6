pub mod config;
pub mod controller;
pub mod hookenv;
pub mod hooks;
pub mod resources;

pub use config::Settings;
pub use controller::{
    ClusterState, Context, CredentialStore, DatabaseEngine, DatabaseRequest, Error, HookContext,
    NameResolver, Outcome, Provisioner, RelationSettings, RelationTransport, Result,
    parse_requests, resolve_allowed, shared_db_changed, sort_units,
};
pub use hooks::{SHARED_DB_RELATION_CHANGED, hook_name, run_hook};
