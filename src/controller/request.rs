//! Parsing of shared-db relation settings into database requests
//!
//! A remote unit asks for access in one of two shapes:
//!
//! - single: `database`, `username` and `hostname` keys
//! - multiple: `<label>_database`, `<label>_username` and `<label>_hostname`
//!   for each label, e.g. `nova_database` and `quantum_database`
//!
//! In the multiple shape every key is split on its first underscore, so a
//! label can never itself contain an underscore.

use std::collections::BTreeMap;

/// Flat key-value settings exchanged over a relation
pub type RelationSettings = BTreeMap<String, String>;

const DATABASE: &str = "database";
const USERNAME: &str = "username";
const HOSTNAME: &str = "hostname";

/// One request for access to a database from a remote host
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseRequest {
    /// `None` for the single-request shape
    pub label: Option<String>,
    pub database: String,
    pub username: String,
    pub hostname: String,
}

impl DatabaseRequest {
    pub fn new(
        label: Option<&str>,
        database: impl Into<String>,
        username: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            label: label.map(str::to_string),
            database: database.into(),
            username: username.into(),
            hostname: hostname.into(),
        }
    }

    /// Build a request if all three fields are present
    fn from_fields<'a>(label: Option<&str>, get: impl Fn(&str) -> Option<&'a str>) -> Option<Self> {
        Some(Self::new(label, get(DATABASE)?, get(USERNAME)?, get(HOSTNAME)?))
    }

    /// Relation key under which `field` is published for this request
    pub fn key(&self, field: &str) -> String {
        match &self.label {
            Some(label) => format!("{}_{}", label, field),
            None => field.to_string(),
        }
    }
}

/// Split a multi-shape key into `(label, field)` on the first underscore.
///
/// A key without an underscore is all label with an empty field.
pub fn split_key(key: &str) -> (&str, &str) {
    key.split_once('_').unwrap_or((key, ""))
}

/// Derive the database requests carried by a relation's settings.
///
/// The single shape wins whenever its three keys are present. Otherwise
/// requests are grouped by label and labels missing any field are dropped,
/// since the remote unit may still be setting them. Requests are returned
/// in label order.
pub fn parse_requests(settings: &RelationSettings) -> Vec<DatabaseRequest> {
    if let Some(request) =
        DatabaseRequest::from_fields(None, |field| settings.get(field).map(String::as_str))
    {
        return vec![request];
    }

    let mut labelled: BTreeMap<&str, BTreeMap<&str, &str>> = BTreeMap::new();
    for (key, value) in settings {
        let (label, field) = split_key(key);
        labelled
            .entry(label)
            .or_default()
            .insert(field, value.as_str());
    }

    labelled
        .into_iter()
        .filter_map(|(label, fields)| {
            DatabaseRequest::from_fields(Some(label), |field| fields.get(field).copied())
        })
        .collect()
}
