//! SQL execution via the mysql client
//!
//! This module runs SQL against the local MySQL server as root by invoking the
//! `mysql` command-line client. Used for database and grant provisioning.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::controller::context::DatabaseEngine;
use crate::controller::error::Result;

/// MySQL error code for `SHOW GRANTS` on a user/host pair with no grants
const ER_NONEXISTING_GRANT: u32 = 1141;

/// Errors that can occur during SQL execution
#[derive(Error, Debug)]
pub enum SqlError {
    /// Failed to read the root password
    #[error("Failed to read root password from {path}: {source}")]
    RootPassword {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to run the client binary
    #[error("Failed to execute {binary}: {source}")]
    ExecFailed {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// SQL execution returned an error
    #[error("SQL error: {message}")]
    SqlExecutionError { code: Option<u32>, message: String },
}

impl SqlError {
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SqlError::RootPassword { .. })
    }

    fn code(&self) -> Option<u32> {
        match self {
            SqlError::SqlExecutionError { code, .. } => *code,
            _ => None,
        }
    }
}

/// Result type for SQL operations
pub(crate) type SqlResult<T> = std::result::Result<T, SqlError>;

/// Runs SQL through the `mysql` binary
#[derive(Clone, Debug)]
pub struct MysqlClient {
    binary: String,
    root_password_file: PathBuf,
}

impl MysqlClient {
    pub fn new(binary: impl Into<String>, root_password_file: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.into(),
            root_password_file: root_password_file.as_ref().to_path_buf(),
        }
    }

    async fn root_password(&self) -> SqlResult<String> {
        let contents = tokio::fs::read_to_string(&self.root_password_file)
            .await
            .map_err(|source| SqlError::RootPassword {
                path: self.root_password_file.clone(),
                source,
            })?;
        Ok(contents.trim().to_string())
    }

    /// Execute SQL and return tab-separated rows without headers
    pub(crate) async fn exec_sql(&self, sql: &str) -> SqlResult<String> {
        let password = self.root_password().await?;

        debug!(binary = %self.binary, "Executing SQL");

        // The password goes through the environment to keep it out of the process list
        let output = Command::new(&self.binary)
            .args(["--user=root", "--batch", "--skip-column-names", "--execute"])
            .arg(sql)
            .env("MYSQL_PWD", password)
            .output()
            .await
            .map_err(|source| SqlError::ExecFailed {
                binary: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(SqlError::SqlExecutionError {
                code: parse_error_code(&message),
                message,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl DatabaseEngine for MysqlClient {
    async fn database_exists(&self, database: &str) -> Result<bool> {
        let sql = format!(
            "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = '{}'",
            escape_sql_string(database)
        );
        let result = self.exec_sql(&sql).await?;
        Ok(!result.trim().is_empty())
    }

    async fn create_database(&self, database: &str) -> Result<()> {
        let sql = format!("CREATE DATABASE {}", quote_identifier(database));
        self.exec_sql(&sql).await?;
        Ok(())
    }

    async fn grant_exists(&self, database: &str, username: &str, address: &str) -> Result<bool> {
        let sql = format!("SHOW GRANTS FOR {}", account(username, address));
        match self.exec_sql(&sql).await {
            Ok(grants) => Ok(grants_cover_database(&grants, database)),
            Err(e) if e.code() == Some(ER_NONEXISTING_GRANT) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_grant(
        &self,
        database: &str,
        username: &str,
        address: &str,
        password: &str,
    ) -> Result<()> {
        let sql = format!(
            "GRANT ALL PRIVILEGES ON {}.* TO {} IDENTIFIED BY '{}'",
            quote_identifier(database),
            account(username, address),
            escape_sql_string(password)
        );
        self.exec_sql(&sql).await?;
        Ok(())
    }
}

/// Extract the numeric code from a client error such as
/// `ERROR 1141 (42000) at line 1: There is no such grant defined ...`
fn parse_error_code(stderr: &str) -> Option<u32> {
    let rest = stderr.split("ERROR ").nth(1)?;
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Whether `SHOW GRANTS` output includes the full grant `create_grant` issues
/// on `database`; narrower privileges do not count
fn grants_cover_database(grants: &str, database: &str) -> bool {
    let target = format!("GRANT ALL PRIVILEGES ON {}.* TO ", quote_identifier(database));
    grants.lines().any(|line| line.trim_start().starts_with(&target))
}

/// Render a `'user'@'host'` account name
fn account(username: &str, address: &str) -> String {
    format!(
        "'{}'@'{}'",
        escape_sql_string(username),
        escape_sql_string(address)
    )
}

/// Quote a MySQL identifier with backticks, doubling embedded backticks
///
/// - `nova` -> `` `nova` ``
/// - ``we`ird`` -> `` `we``ird` ``
fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Escape a MySQL string literal body
///
/// Backslashes are escaped first, then single quotes are doubled.
fn escape_sql_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "''")
}
