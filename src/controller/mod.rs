pub mod allowed_units;
pub mod context;
pub mod error;
pub mod provisioner;
pub mod reconciler;
pub mod request;

pub use allowed_units::{resolve_allowed, sort_units, unit_ordinal};
pub use context::{
    ClusterState, Context, CredentialStore, DatabaseEngine, HookContext, NameResolver,
    RelationTransport,
};
pub use error::{Error, Result};
pub use provisioner::Provisioner;
pub use reconciler::{Outcome, shared_db_changed};
pub use request::{DatabaseRequest, RelationSettings, parse_requests, split_key};
