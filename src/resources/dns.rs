//! Forward name resolution for requesting hosts

use std::net::IpAddr;

use tokio::net::lookup_host;

use crate::controller::context::NameResolver;
use crate::controller::error::{Error, Result};

/// Resolves names with the system resolver
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl NameResolver for SystemResolver {
    /// Resolve `hostname`, preferring an IPv4 address when both families are
    /// returned. IP literals resolve to themselves.
    async fn resolve(&self, hostname: &str) -> Result<IpAddr> {
        if let Ok(address) = hostname.parse::<IpAddr>() {
            return Ok(address);
        }

        let addresses: Vec<IpAddr> = lookup_host((hostname, 0))
            .await
            .map_err(|e| Error::ResolutionError {
                hostname: hostname.to_string(),
                reason: e.to_string(),
            })?
            .map(|socket| socket.ip())
            .collect();

        addresses
            .iter()
            .find(|address| address.is_ipv4())
            .or_else(|| addresses.first())
            .copied()
            .ok_or_else(|| Error::ResolutionError {
                hostname: hostname.to_string(),
                reason: "no addresses returned".to_string(),
            })
    }
}
