//! Unit tests for allowed unit resolution

use shared_db_reconciler::config::RELATION_NAME;
use shared_db_reconciler::resolve_allowed;

use crate::common::*;

fn units(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn test_granted_units_sorted_by_ordinal() {
    let database = FakeDatabase::default()
        .with_grant("nova", "nova", "10.0.0.1")
        .with_grant("nova", "nova", "10.0.0.10");
    let relation = FakeRelation::new(settings(&[]))
        .with_unit("shared-db:1", "app/10", Some("10.0.0.10"))
        .with_unit("shared-db:1", "app/2", Some("10.0.0.2"))
        .with_unit("shared-db:1", "app/1", Some("10.0.0.1"));

    let allowed = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();

    assert_eq!(allowed, units(&["app/1", "app/10"]));
}

#[tokio::test]
async fn test_units_collected_across_relation_ids() {
    let database = FakeDatabase::default()
        .with_grant("nova", "nova", "10.0.0.3")
        .with_grant("nova", "nova", "10.0.0.4");
    let relation = FakeRelation::new(settings(&[]))
        .with_unit("shared-db:1", "nova-cc/3", Some("10.0.0.3"))
        .with_unit("shared-db:7", "nova-compute/4", Some("10.0.0.4"))
        .with_unit("shared-db:7", "nova-compute/0", Some("10.0.0.99"));

    let allowed = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();

    assert_eq!(allowed, units(&["nova-cc/3", "nova-compute/4"]));
}

#[tokio::test]
async fn test_grant_for_other_database_or_user_does_not_count() {
    let database = FakeDatabase::default()
        .with_grant("glance", "nova", "10.0.0.1")
        .with_grant("nova", "glance", "10.0.0.1");
    let relation =
        FakeRelation::new(settings(&[])).with_unit("shared-db:1", "app/1", Some("10.0.0.1"));

    let allowed = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();

    assert!(allowed.is_empty());
}

#[tokio::test]
async fn test_unit_without_address_is_skipped() {
    let database = FakeDatabase::default().with_grant("nova", "nova", "10.0.0.1");
    let relation = FakeRelation::new(settings(&[]))
        .with_unit("shared-db:1", "app/0", None)
        .with_unit("shared-db:1", "app/1", Some("10.0.0.1"));

    let allowed = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();

    assert_eq!(allowed, units(&["app/1"]));
    assert_eq!(database.calls().len(), 1);
}

#[tokio::test]
async fn test_reads_live_state_on_every_call() {
    let database = FakeDatabase::default();
    let relation =
        FakeRelation::new(settings(&[])).with_unit("shared-db:1", "app/1", Some("10.0.0.1"));

    let before = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();
    assert!(before.is_empty());

    let database = database.with_grant("nova", "nova", "10.0.0.1");
    let after = resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();
    assert_eq!(after, units(&["app/1"]));
}

#[tokio::test]
async fn test_only_named_relation_is_queried() {
    let database = FakeDatabase::default();
    let relation = FakeRelation::new(settings(&[]));

    resolve_allowed(&database, &relation, RELATION_NAME, "nova", "nova")
        .await
        .unwrap();

    assert_eq!(relation.queried_relation_names(), vec!["shared-db".to_string()]);
}
