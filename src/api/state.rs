use std::sync::Arc;

use crate::auth::{Authenticator, CredentialStore, CredentialVerifier, TrustingCredentials};
use crate::blob::BlobStore;
use crate::database::Database;
use crate::locks::RecordLocks;

/// Everything a request handler can reach. Built once at start-up and cloned into every request.
#[derive(Debug, Clone)]
pub struct App {
    pub database: Database,
    pub blobs: BlobStore,
    pub authenticator: Arc<Authenticator>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub credentials: Arc<dyn CredentialStore>,
    pub locks: RecordLocks,
}

impl App {
    /// Tokens are verified by the same authenticator that issues them.
    pub fn new(database: Database, authenticator: Authenticator, blobs: BlobStore) -> Self {
        let authenticator = Arc::new(authenticator);

        App {
            database,
            blobs,
            verifier: authenticator.clone(),
            authenticator,
            credentials: Arc::new(TrustingCredentials),
            locks: RecordLocks::default(),
        }
    }

    pub fn with_verifier(self, verifier: impl CredentialVerifier + 'static) -> Self {
        App {
            verifier: Arc::new(verifier),
            ..self
        }
    }

    pub fn with_credentials(self, credentials: impl CredentialStore + 'static) -> Self {
        App {
            credentials: Arc::new(credentials),
            ..self
        }
    }
}
