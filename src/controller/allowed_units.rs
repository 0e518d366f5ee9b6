//! Which related units currently hold a working grant

use std::collections::BTreeSet;

use tracing::debug;

use crate::controller::context::{DatabaseEngine, RelationTransport};
use crate::controller::error::Result;

/// Numeric ordinal of a unit name, the part after the final `/`
pub fn unit_ordinal(unit: &str) -> Option<u64> {
    unit.rsplit('/').next()?.parse().ok()
}

/// Sort unit names by ordinal so `app/2` comes before `app/10`.
///
/// Names without a numeric ordinal sort last, by name.
pub fn sort_units(units: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut units: Vec<String> = units.into_iter().collect();
    units.sort_by_cached_key(|unit| {
        let ordinal = unit_ordinal(unit);
        (ordinal.is_none(), ordinal, unit.clone())
    });
    units
}

/// Units on any instance of `relation_name` whose advertised address has a
/// grant for `(database, username)`.
///
/// Reads live relation membership and grant state on every call.
pub async fn resolve_allowed<D, R>(
    engine: &D,
    relation: &R,
    relation_name: &str,
    database: &str,
    username: &str,
) -> Result<Vec<String>>
where
    D: DatabaseEngine,
    R: RelationTransport,
{
    let mut allowed = BTreeSet::new();

    for relation_id in relation.relation_ids(relation_name).await? {
        for unit in relation.related_units(&relation_id).await? {
            let Some(address) = relation.unit_address(&relation_id, &unit).await? else {
                debug!(unit = %unit, relation_id = %relation_id, "Unit has no address yet");
                continue;
            };
            if engine.grant_exists(database, username, &address).await? {
                allowed.insert(unit);
            }
        }
    }

    Ok(sort_units(allowed))
}
