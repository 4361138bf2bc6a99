use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret as _, SecretString};

use crate::prelude::*;

/// How long an issued token stays valid, in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// The authenticated caller, attached to every request that passed the auth gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize, new)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, new)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum AuthError {
    #[snafu(display("Access denied"))]
    Missing,

    #[snafu(display("Invalid token"))]
    Invalid { source: jsonwebtoken::errors::Error },

    #[snafu(display("failed to sign a token for `{email}`"))]
    Encode {
        email: String,
        source: jsonwebtoken::errors::Error,
    },
}

/// Turns a presented credential into an [Identity].
pub trait CredentialVerifier: std::fmt::Debug + Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Issues and verifies HMAC-signed JWTs.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: SecretString,
    algorithm: Algorithm,
    validation: Validation,
    lifetime: Duration,
}

impl Authenticator {
    pub fn new(secret: SecretString) -> Self {
        let algorithm = Algorithm::HS256;
        Self {
            secret,
            algorithm,
            validation: Validation::new(algorithm),
            lifetime: Duration::seconds(TOKEN_LIFETIME_SECS),
        }
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_ref())
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_ref())
    }

    fn header(&self) -> Header {
        Header::new(self.algorithm)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key(), &self.validation)
            .map(|data| data.claims)
            .context(InvalidSnafu)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&self.header(), claims, &self.encoding_key())
            .context(EncodeSnafu { email: &claims.email })
    }

    pub fn claims_for(&self, email: &str) -> Claims {
        let now = Utc::now();
        Claims::new(email.to_string(), now.timestamp(), (now + self.lifetime).timestamp())
    }

    /// Signs a token for `email`, valid for [TOKEN_LIFETIME_SECS].
    pub fn issue(&self, email: &str) -> Result<String, AuthError> {
        self.encode(&self.claims_for(email))
    }
}

impl CredentialVerifier for Authenticator {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.decode(token).map(|claims| Identity::new(claims.email))
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(header::AUTHORIZATION).context(MissingSnafu)?;
    let header = header.to_str().ok().context(MissingSnafu)?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .context(MissingSnafu)
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CredentialError {
    #[snafu(display("Invalid email or password"))]
    Rejected { email: String },

    #[snafu(display("User `{username}` cannot be registered"))]
    Registration { username: String },
}

/// Where account passwords live.
#[async_trait]
pub trait CredentialStore: std::fmt::Debug + Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<(), CredentialError>;

    async fn verify(&self, email: &str, password: &str) -> Result<(), CredentialError>;
}

/// Accepts every sign-up and every login without storing anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrustingCredentials;

#[async_trait]
impl CredentialStore for TrustingCredentials {
    async fn register(&self, username: &str, _password: &str) -> Result<(), CredentialError> {
        tracing::info!(username, "accepted sign-up without storing it");
        Ok(())
    }

    async fn verify(&self, email: &str, _password: &str) -> Result<(), CredentialError> {
        tracing::debug!(email, "accepted login without checking the password");
        Ok(())
    }
}
