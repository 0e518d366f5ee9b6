//! Juju hook tool wrappers
//!
//! Hooks talk to the Juju agent through command-line tools available on the
//! `PATH` while a hook runs (`relation-get`, `relation-set`, `unit-get`, ...).
//! Output is requested as JSON wherever the tool supports it.

pub mod cluster;

use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::{HA_RELATION, PEER_RELATION};
use crate::controller::context::{ClusterState, RelationTransport};
use crate::controller::error::{Error, Result};
use crate::controller::request::RelationSettings;

/// Errors from running a hook tool
#[derive(Error, Debug)]
pub enum HookToolError {
    #[error("Failed to execute {tool}: {source}")]
    ExecFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("Unexpected output from {tool}: {source}")]
    ParseError {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) type ToolResult<T> = std::result::Result<T, HookToolError>;

/// Run a hook tool and return its stdout
pub(crate) async fn run_tool(tool: &str, args: &[&str]) -> ToolResult<String> {
    debug!(tool = %tool, args = ?args, "Running hook tool");

    let output = Command::new(tool)
        .args(args)
        .output()
        .await
        .map_err(|source| HookToolError::ExecFailed {
            tool: tool.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(HookToolError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a hook tool with `--format json` and parse its output
async fn run_json_tool(tool: &str, args: &[&str]) -> ToolResult<Value> {
    let mut full_args = vec!["--format", "json"];
    full_args.extend_from_slice(args);
    let stdout = run_tool(tool, &full_args).await?;
    parse_json(tool, &stdout)
}

fn parse_json(tool: &str, stdout: &str) -> ToolResult<Value> {
    // Tools print nothing at all for an unset value
    if stdout.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(stdout).map_err(|source| HookToolError::ParseError {
        tool: tool.to_string(),
        source,
    })
}

/// Render a JSON scalar as a relation value; `null` means unset
fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Convert a `relation-get` JSON object into settings, dropping unset keys
pub(crate) fn settings_from_json(value: Value) -> RelationSettings {
    match value {
        Value::Object(map) => map
            .into_iter()
            .filter_map(|(key, value)| value_to_string(value).map(|v| (key, v)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn strings_from_json(tool: &str, value: Value) -> ToolResult<Vec<String>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|source| HookToolError::ParseError {
        tool: tool.to_string(),
        source,
    })
}

/// All settings of the remote unit on the triggering relation
pub async fn relation_get() -> ToolResult<RelationSettings> {
    let value = run_json_tool("relation-get", &["-"]).await?;
    Ok(settings_from_json(value))
}

/// One setting of `unit` on relation `relation_id`
pub async fn relation_get_attr(
    attribute: &str,
    relation_id: &str,
    unit: &str,
) -> ToolResult<Option<String>> {
    let value = run_json_tool("relation-get", &["-r", relation_id, attribute, unit]).await?;
    Ok(value_to_string(value))
}

/// Set keys on the local side of the triggering relation
pub async fn relation_set(settings: &RelationSettings) -> ToolResult<()> {
    if settings.is_empty() {
        return Ok(());
    }
    let pairs: Vec<String> = settings
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    let args: Vec<&str> = pairs.iter().map(String::as_str).collect();
    run_tool("relation-set", &args).await?;
    Ok(())
}

/// Ids of every established relation named `relation_name`
pub async fn relation_ids(relation_name: &str) -> ToolResult<Vec<String>> {
    let value = run_json_tool("relation-ids", &[relation_name]).await?;
    strings_from_json("relation-ids", value)
}

/// Remote units on relation `relation_id`
pub async fn related_units(relation_id: &str) -> ToolResult<Vec<String>> {
    let value = run_json_tool("relation-list", &["-r", relation_id]).await?;
    strings_from_json("relation-list", value)
}

/// An attribute of the local unit, e.g. `private-address`
pub async fn unit_get(attribute: &str) -> ToolResult<String> {
    Ok(run_tool("unit-get", &[attribute]).await?.trim().to_string())
}

/// A service configuration option, `None` when unset
pub async fn config_get(key: &str) -> ToolResult<Option<String>> {
    let value = run_json_tool("config-get", &[key]).await?;
    Ok(value_to_string(value).filter(|v| !v.is_empty()))
}

/// Hook tool backed relation transport and cluster state for the local unit
#[derive(Clone, Debug)]
pub struct HookEnv {
    unit_name: String,
}

impl HookEnv {
    pub fn new(unit_name: impl Into<String>) -> Self {
        Self {
            unit_name: unit_name.into(),
        }
    }
}

impl RelationTransport for HookEnv {
    async fn read_settings(&self) -> Result<RelationSettings> {
        Ok(relation_get().await?)
    }

    async fn publish(&self, settings: &RelationSettings) -> Result<()> {
        Ok(relation_set(settings).await?)
    }

    async fn relation_ids(&self, relation_name: &str) -> Result<Vec<String>> {
        Ok(relation_ids(relation_name).await?)
    }

    async fn related_units(&self, relation_id: &str) -> Result<Vec<String>> {
        Ok(related_units(relation_id).await?)
    }

    async fn unit_address(&self, relation_id: &str, unit: &str) -> Result<Option<String>> {
        Ok(relation_get_attr("private-address", relation_id, unit).await?)
    }
}

impl ClusterState for HookEnv {
    async fn is_eligible_leader(&self, resource: &str) -> Result<bool> {
        if self.is_clustered().await? {
            return Ok(cluster::is_crm_leader(resource).await);
        }

        let mut peers = Vec::new();
        for relation_id in relation_ids(PEER_RELATION).await? {
            peers.extend(related_units(&relation_id).await?);
        }
        Ok(cluster::oldest_peer(&peers, &self.unit_name))
    }

    async fn is_clustered(&self) -> Result<bool> {
        for relation_id in relation_ids(HA_RELATION).await? {
            for unit in related_units(&relation_id).await? {
                let clustered = relation_get_attr("clustered", &relation_id, &unit).await?;
                if clustered.is_some_and(|v| !v.is_empty()) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    async fn virtual_address(&self) -> Result<String> {
        config_get("vip")
            .await?
            .ok_or_else(|| Error::ConfigError("service is clustered but vip is not set".to_string()))
    }

    async fn local_address(&self) -> Result<String> {
        Ok(unit_get("private-address").await?)
    }
}
