// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::error::Error;

use aura_notes_server::{
    api::router,
    auth::SessionManager,
    config::{AppConfig, LogFormat},
    logging::init_logging,
    state::AppState,
    storage::NotesDatabase,
};
use axum_server::tls_rustls::RustlsConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    init_logging(LogFormat::from_env());

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    if config.session_secret_generated {
        tracing::warn!("SESSION_SECRET not set; using a random secret, sessions will not survive a restart");
    }

    let db = NotesDatabase::open_in_dir(&config.data_dir)?;
    tracing::info!(data_dir = %config.data_dir.display(), "Opened note database");

    let sessions = SessionManager::new(&config.session_secret, config.session_ttl)
        .with_secure_cookie(config.tls.is_some());
    let state = AppState::new(db, sessions);
    let app = router(state, config.cors_permissive);

    let addr = config.bind_addr;
    match &config.tls {
        Some(tls) => {
            // Install the ring crypto provider for rustls (must be done before any TLS operations)
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| "failed to install rustls crypto provider")?;

            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;
            tracing::info!(%addr, "Aura Notes listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            tracing::info!(%addr, "Aura Notes listening on http (docs at /docs)");
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
