use clipshare::api::{create_router, App};
use clipshare::config::Config;
use clipshare::error::{BindAddressSnafu, BlobDirectorySnafu, ConnectDatabaseSnafu, WebServerSnafu};
use clipshare::{logger, InitError};
use dotenvy::dotenv;
use snafu::ResultExt;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), InitError> {
    dotenv().ok();

    let config = Config::from_env()?;
    let _guard = logger::init(&config)?;

    let database = config.database().await.context(ConnectDatabaseSnafu)?;
    let blobs = config.blob_store().await.context(BlobDirectorySnafu {
        path: config.upload_dir.clone(),
    })?;

    let app = App::new(database, config.authenticator(), blobs);
    let router = create_router(app, config.public_dir.clone());

    let listener = TcpListener::bind(config.host)
        .await
        .context(BindAddressSnafu { address: config.host })?;

    tracing::info!("listening on {}", config.host);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(WebServerSnafu)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutting down");
}
