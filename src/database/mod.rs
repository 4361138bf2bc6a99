use serde::Deserialize;
use snafu::ResultExt;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth;
use surrealdb::Surreal;
use url::Url;

/// Helper trait for executing arbitrary SurrealQL queries.
pub mod query;

/// Macros for defining table methods.
pub mod macros;

mod error;
mod record;

pub use error::*;
pub use query::{Bindings, Sql};
pub use record::Record;
pub use surrealdb::sql::Thing;

const SETUP: &str = include_str!("../../schema.surrealql");

/// A type that is stored in its own table.
pub trait Table {
    /// Returns the name of the table associated with the record.
    fn table() -> &'static str;
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(rename = "database_url")]
    pub url: Url,
    #[serde(rename = "surreal_namespace", default = "default_name")]
    pub namespace: String,
    #[serde(rename = "surreal_database", default = "default_name")]
    pub database: String,
    #[serde(rename = "surreal_username", default)]
    pub username: Option<String>,
    #[serde(rename = "surreal_password", default)]
    pub password: Option<String>,
}

fn default_name() -> String {
    "clipshare".to_string()
}

impl DatabaseConfig {
    /// An in-process datastore, every connection starts empty.
    pub fn memory() -> Result<Self, url::ParseError> {
        Ok(Self {
            url: Url::parse("mem://")?,
            namespace: default_name(),
            database: default_name(),
            username: None,
            password: None,
        })
    }
}

/// Represents a database wrapper.
///
/// Cloning is cheap, all clones share the same underlying connection.
#[derive(Debug, Clone)]
pub struct Database {
    database: Surreal<Any>,
}

impl Database {
    /// Connects to the configured endpoint, signs in when credentials are present and applies the schema.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseConnectionError> {
        let url = &config.url;
        let database = surrealdb::engine::any::connect(url.as_str())
            .await
            .context(ConnectionSnafu { url: url.clone() })?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            database
                .signin(auth::Database {
                    namespace: &config.namespace,
                    database: &config.database,
                    username,
                    password,
                })
                .await
                .context(SignInSnafu { username })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(SelectSnafu {
                namespace: &config.namespace,
                database: &config.database,
            })?;

        database
            .query(SETUP)
            .await
            .and_then(|response| response.check())
            .context(SetupSnafu)?;

        tracing::info!(url = %url, namespace = %config.namespace, database = %config.database, "connected to the database");

        Ok(Self { database })
    }
}

impl std::ops::Deref for Database {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.database
    }
}
