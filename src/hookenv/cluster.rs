//! Leader determination for peered and clustered deployments
//!
//! A clustered service (VIP managed by pacemaker over the `ha` relation) is
//! led by the node currently running the leader resource. An unclustered
//! service with peers is led by the unit with the lowest unit number.

use tracing::{debug, info};

use crate::controller::allowed_units::unit_ordinal;
use crate::hookenv::run_tool;

/// Whether the local host currently runs the pacemaker `resource`.
///
/// Any failure to query pacemaker means this node is not the leader.
pub async fn is_crm_leader(resource: &str) -> bool {
    let status = match run_tool("crm", &["resource", "show", resource]).await {
        Ok(status) => status,
        Err(e) => {
            debug!(resource = %resource, error = %e, "Unable to query CRM resource");
            return false;
        }
    };

    let host = match hostname::get() {
        Ok(host) => host.to_string_lossy().to_string(),
        Err(e) => {
            debug!(error = %e, "Unable to determine local hostname");
            return false;
        }
    };

    let leader = crm_status_names_host(&status, &host);
    if !leader {
        info!(resource = %resource, "Deferring action to CRM leader");
    }
    leader
}

/// Whether `crm resource show` output reports the resource on `host`.
/// The host must appear as a whole word, not as part of a longer name.
pub fn crm_status_names_host(status: &str, host: &str) -> bool {
    !host.is_empty() && status.split_whitespace().any(|token| token == host)
}

/// Whether `local_unit` has the lowest unit number among itself and `peers`
pub fn oldest_peer(peers: &[String], local_unit: &str) -> bool {
    let Some(local) = unit_ordinal(local_unit) else {
        return false;
    };

    let oldest = peers
        .iter()
        .filter_map(|peer| unit_ordinal(peer))
        .all(|remote| remote >= local);
    if !oldest {
        info!(unit = %local_unit, "Deferring action to oldest service unit");
    }
    oldest
}
