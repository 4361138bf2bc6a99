use std::net::SocketAddr;
use std::path::PathBuf;

use snafu::{Location, Snafu};

use crate::database::DatabaseConnectionError;

/// Failures that stop the service before it can accept requests.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum InitError {
    /// could not parse the configuration from the environment
    #[snafu(display("could not load the configuration at {location}: {source}"))]
    ConfigLoad {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not connect to the database at {location}: {source}"))]
    ConnectDatabase {
        source: DatabaseConnectionError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not create the directory that holds uploaded blobs
    #[snafu(display("could not prepare the upload directory `{}` at {location}: {source}", path.display()))]
    BlobDirectory {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not bind to the given address, check if it's already in use
    #[snafu(display("could not bind to {address} at {location}: {source}"))]
    BindAddress {
        address: SocketAddr,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not serve the application at {location}: {source}"))]
    WebServer {
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("could not initialize the logger at {location}: {source}"))]
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Input that is well-formed but not acceptable.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum ValidationError {
    #[snafu(display("Rating must be between 1 and 5"))]
    OutOfRange { rating: i64 },

    #[snafu(display("Query parameter is required"))]
    MissingQuery,
}
