//! Provisioning of credentials, databases and grants for a single request

use std::net::{IpAddr, Ipv4Addr};

use tracing::{debug, info};

use crate::controller::context::{CredentialStore, DatabaseEngine, NameResolver};
use crate::controller::error::Result;
use crate::controller::request::DatabaseRequest;

/// Ensures a request's credential, database and grant exist
pub struct Provisioner<'a, D, N, S> {
    database: &'a D,
    resolver: &'a N,
    credentials: &'a S,
    /// Address of the local unit; requests from it are granted on loopback
    local_address: &'a str,
}

impl<'a, D, N, S> Provisioner<'a, D, N, S>
where
    D: DatabaseEngine,
    N: NameResolver,
    S: CredentialStore,
{
    pub fn new(database: &'a D, resolver: &'a N, credentials: &'a S, local_address: &'a str) -> Self {
        Self {
            database,
            resolver,
            credentials,
            local_address,
        }
    }

    /// Address grants are bound to for a requesting host
    pub async fn resolve_address(&self, hostname: &str) -> Result<IpAddr> {
        if hostname == self.local_address {
            return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
        }
        self.resolver.resolve(hostname).await
    }

    /// Provision access for a request and return the user's password.
    ///
    /// Every step is create-if-absent, so running this again for the same
    /// request issues no mutations.
    pub async fn provision(&self, request: &DatabaseRequest) -> Result<String> {
        let address = self.resolve_address(&request.hostname).await?.to_string();
        let password = self.credentials.load_or_create(&request.username).await?;

        if !self.database.database_exists(&request.database).await? {
            info!(database = %request.database, "Creating database");
            self.database.create_database(&request.database).await?;
        }

        if self
            .database
            .grant_exists(&request.database, &request.username, &address)
            .await?
        {
            debug!(
                database = %request.database,
                username = %request.username,
                address = %address,
                "Grant already exists"
            );
        } else {
            info!(
                database = %request.database,
                username = %request.username,
                address = %address,
                "Creating grant"
            );
            self.database
                .create_grant(&request.database, &request.username, &address, &password)
                .await?;
        }

        Ok(password)
    }
}
