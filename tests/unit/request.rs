//! Unit tests for request parsing

use shared_db_reconciler::{DatabaseRequest, parse_requests};

use crate::common::settings;

#[test]
fn test_single_shape_routes_to_one_unlabelled_request() {
    let requests = parse_requests(&settings(&[
        ("database", "d"),
        ("username", "u"),
        ("hostname", "h"),
    ]));

    assert_eq!(requests, vec![DatabaseRequest::new(None, "d", "u", "h")]);
}

#[test]
fn test_multi_shape_routes_to_one_request_per_label() {
    let requests = parse_requests(&settings(&[
        ("nova_database", "d1"),
        ("nova_username", "u1"),
        ("nova_hostname", "h1"),
        ("quantum_database", "d2"),
        ("quantum_username", "u2"),
        ("quantum_hostname", "h2"),
    ]));

    assert_eq!(
        requests,
        vec![
            DatabaseRequest::new(Some("nova"), "d1", "u1", "h1"),
            DatabaseRequest::new(Some("quantum"), "d2", "u2", "h2"),
        ]
    );
}

#[test]
fn test_incomplete_label_is_dropped() {
    let requests = parse_requests(&settings(&[
        ("nova_database", "d1"),
        ("nova_username", "u1"),
    ]));

    assert!(requests.is_empty());
}

#[test]
fn test_extra_fields_do_not_block_a_label() {
    let requests = parse_requests(&settings(&[
        ("nova_database", "d1"),
        ("nova_username", "u1"),
        ("nova_hostname", "h1"),
        ("nova_password", "stale"),
        ("private-address", "10.0.0.1"),
    ]));

    assert_eq!(
        requests,
        vec![DatabaseRequest::new(Some("nova"), "d1", "u1", "h1")]
    );
}

#[test]
fn test_empty_settings() {
    assert!(parse_requests(&settings(&[])).is_empty());
}
