use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::{ApiError, App};
use crate::auth::CredentialStore as _;
use crate::prelude::*;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize, new)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize, new)]
pub struct TokenResponse {
    pub token: String,
}

#[instrument(skip_all)]
pub async fn signup(
    State(app): State<App>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload?;

    app.credentials
        .register(&request.username, &request.password)
        .await?;

    let response = MessageResponse::new("User signed up successfully");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip_all)]
pub async fn login(
    State(app): State<App>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;

    app.credentials
        .verify(&request.email, &request.password)
        .await?;

    let token = app.authenticator.issue(&request.email)?;
    tracing::info!(email = %request.email, "issued token");

    Ok(Json(TokenResponse::new(token)))
}
