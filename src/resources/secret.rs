//! On-disk credential store
//!
//! Each username's password lives in `<base>-<username>.secret`, readable
//! only by the owner. A password is generated the first time a username is
//! seen and is reused from then on: grants already handed out depend on it.

use std::io;
use std::path::{Path, PathBuf};

use rand::Rng;
use rand::distr::Alphanumeric;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::controller::context::CredentialStore;
use crate::controller::error::{Error, Result};

const PASSWORD_LEN: usize = 16;
const SECRET_EXTENSION: &str = "secret";

/// A fresh alphanumeric password of `PASSWORD_LEN` characters
pub fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Credential store backed by one file per username
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    base: PathBuf,
}

impl FileCredentialStore {
    /// `base` is the path prefix, e.g. `/var/lib/mysql/mysql`
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    /// Path of the secret file for `username`
    pub fn path_for(&self, username: &str) -> Result<PathBuf> {
        if username.is_empty()
            || username.starts_with('.')
            || username.contains(['/', '\0'])
        {
            return Err(Error::InvalidUsernameError(username.to_string()));
        }

        let mut path = self.base.clone().into_os_string();
        path.push(format!("-{}.{}", username, SECRET_EXTENSION));
        Ok(PathBuf::from(path))
    }

    async fn read(&self, username: &str, path: &Path) -> Result<Option<String>> {
        let contents = match fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(credential_error(username, source)),
        };

        let password = contents.trim();
        if password.is_empty() {
            return Err(credential_error(
                username,
                io::Error::new(io::ErrorKind::InvalidData, "secret file is empty"),
            ));
        }
        Ok(Some(password.to_string()))
    }

    /// Write a new password to a temporary sibling and hard link it into place,
    /// so the secret path only ever holds a complete, flushed password and an
    /// existing secret is never replaced.
    async fn create(&self, username: &str, path: &Path) -> Result<String> {
        let password = generate_password();
        let staging = path.with_extension(format!("{}.tmp", SECRET_EXTENSION));

        // Leftover from an interrupted run
        match fs::remove_file(&staging).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => return Err(credential_error(username, source)),
        }

        if let Err(source) = write_secret(&staging, &password).await {
            let _ = fs::remove_file(&staging).await;
            return Err(credential_error(username, source));
        }

        let linked = fs::hard_link(&staging, path).await;
        let _ = fs::remove_file(&staging).await;

        match linked {
            Ok(()) => {
                info!(username = %username, path = %path.display(), "Stored new credential");
                Ok(password)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!(username = %username, "Credential appeared concurrently, keeping it");
                self.read(username, path).await?.ok_or_else(|| {
                    credential_error(
                        username,
                        io::Error::new(io::ErrorKind::NotFound, "secret file vanished"),
                    )
                })
            }
            Err(source) => Err(credential_error(username, source)),
        }
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load_or_create(&self, username: &str) -> Result<String> {
        let path = self.path_for(username)?;
        match self.read(username, &path).await? {
            Some(password) => Ok(password),
            None => self.create(username, &path).await,
        }
    }
}

async fn write_secret(path: &Path, password: &str) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(password.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await
}

fn credential_error(username: &str, source: io::Error) -> Error {
    Error::CredentialIoError {
        username: username.to_string(),
        source,
    }
}
