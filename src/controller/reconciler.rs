//! Reconciler for the shared-db relation
//!
//! Runs on `shared-db-relation-changed`. The leader unit provisions every
//! database request the remote unit made, then publishes the credentials,
//! the units that already have access and the host to connect to.

use tracing::{debug, info};

use crate::controller::allowed_units::resolve_allowed;
use crate::controller::context::{
    ClusterState, Context, CredentialStore, DatabaseEngine, NameResolver, RelationTransport,
};
use crate::controller::error::Result;
use crate::controller::provisioner::Provisioner;
use crate::controller::request::{RelationSettings, parse_requests};

/// Key carrying the address peers connect to
pub const DB_HOST_KEY: &str = "db_host";
pub const PASSWORD_KEY: &str = "password";
pub const ALLOWED_UNITS_KEY: &str = "allowed_units";

/// Result of a reconciliation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Another unit is the leader; nothing was touched
    NotLeader,
    /// These settings were set on the relation
    Published(RelationSettings),
}

/// Reconcile access for the remote unit of the triggering relation.
///
/// Any failure aborts before publishing, so peers keep their last published
/// values until the next successful run.
pub async fn shared_db_changed<D, R, C, N, S>(ctx: &Context<D, R, C, N, S>) -> Result<Outcome>
where
    D: DatabaseEngine,
    R: RelationTransport,
    C: ClusterState,
    N: NameResolver,
    S: CredentialStore,
{
    if !ctx.cluster.is_eligible_leader(&ctx.leader_resource).await? {
        info!(
            "MySQL service is peered, bailing shared-db relation as this service unit is not the leader"
        );
        return Ok(Outcome::NotLeader);
    }

    let settings = ctx.relation.read_settings().await?;
    let local_address = ctx.cluster.local_address().await?;
    let requests = parse_requests(&settings);

    debug!(
        requests = requests.len(),
        keys = settings.len(),
        "Parsed shared-db settings"
    );

    let provisioner = Provisioner::new(
        &ctx.database,
        &ctx.resolver,
        &ctx.credentials,
        &local_address,
    );

    let mut published = RelationSettings::new();
    for request in &requests {
        let password = provisioner.provision(request).await?;
        let allowed_units = resolve_allowed(
            &ctx.database,
            &ctx.relation,
            &ctx.relation_name,
            &request.database,
            &request.username,
        )
        .await?;

        info!(
            database = %request.database,
            username = %request.username,
            allowed_units = allowed_units.len(),
            "Provisioned database access"
        );

        published.insert(request.key(PASSWORD_KEY), password);
        published.insert(request.key(ALLOWED_UNITS_KEY), allowed_units.join(" "));
    }

    let db_host = if ctx.cluster.is_clustered().await? {
        ctx.cluster.virtual_address().await?
    } else {
        local_address
    };
    published.insert(DB_HOST_KEY.to_string(), db_host);

    ctx.relation.publish(&published).await?;

    Ok(Outcome::Published(published))
}
