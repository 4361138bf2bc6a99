use std::path::PathBuf;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{bearer_token, CredentialVerifier as _};
use crate::blob::PUBLIC_PREFIX;

mod account;
mod error;
mod state;
mod videos;

pub use account::*;
pub use error::*;
pub use state::App;
pub use videos::*;

pub type Result<T, E = ApiError> = std::result::Result<T, E>;

/// Rejects the request unless it carries a valid bearer token, then hands the caller's
/// [crate::auth::Identity] to the handler as an extension.
pub async fn authenticate(State(app): State<App>, mut request: Request, next: Next) -> Result<Response> {
    let token = bearer_token(request.headers())?;
    let identity = app.verifier.verify(token)?;

    tracing::debug!(email = %identity.email, "authenticated request");
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Builds every route of the service.
///
/// Uploaded files are served under `/uploads`, anything else falls through to `public_dir` when one is given.
pub fn create_router(app: App, public_dir: Option<PathBuf>) -> Router {
    let protected = Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(app.blobs.body_limit())),
        )
        .route("/like/:id", post(like))
        .route("/rate/:id", post(rate))
        .route_layer(middleware::from_fn_with_state(app.clone(), authenticate));

    let public = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/videos", get(list))
        .route("/search", get(search));

    let mut router = Router::new()
        .merge(protected)
        .merge(public)
        .nest_service(&format!("/{PUBLIC_PREFIX}"), ServeDir::new(app.blobs.root()));

    if let Some(public_dir) = public_dir {
        router = router.fallback_service(ServeDir::new(public_dir));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app)
}
