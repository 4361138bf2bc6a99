use std::net::SocketAddr;
use std::path::PathBuf;

use secrecy::SecretString;
use serde_with::{serde_as, DisplayFromStr};

use crate::auth::Authenticator;
use crate::blob::{BlobStore, DEFAULT_MAX_UPLOAD_BYTES};
use crate::database::{Database, DatabaseConfig, DatabaseConnectionError};
use crate::error::{ConfigLoadSnafu, InitError};
use crate::prelude::*;

/// Settings read from the environment (and `.env`) at start-up.
///
/// Flattening makes every value arrive as a string, so numbers are parsed with [DisplayFromStr].
#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,
    #[serde(flatten)]
    pub database: DatabaseConfig,
    /// Secret used to sign and verify tokens.
    pub jwt_secret: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    /// Front-end files served for every path no route claims.
    #[serde(default)]
    pub public_dir: Option<PathBuf>,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde_as(as = "DisplayFromStr")]
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl Config {
    pub fn from_env() -> Result<Config, InitError> {
        envy::from_env::<Config>().context(ConfigLoadSnafu)
    }

    pub async fn database(&self) -> Result<Database, DatabaseConnectionError> {
        Database::connect(&self.database).await
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(SecretString::new(self.jwt_secret.clone()))
    }

    pub async fn blob_store(&self) -> std::io::Result<BlobStore> {
        BlobStore::open(&self.upload_dir, self.max_upload_bytes).await
    }
}
