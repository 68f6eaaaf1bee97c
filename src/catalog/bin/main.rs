use std::error::Error;
use std::net::SocketAddr;
use quotes::catalog::controller::build_router;
use quotes::catalog::factory::create_catalog_service;
use quotes::core::controller::AppState;
use quotes::core::domain::Configuration;
use quotes::core::repository::StorageBackend;
use quotes::utils::logs::setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = Configuration::from_env()?;
    setup_tracing(&config);

    let backend = StorageBackend::connect(&config).await?;
    let service = create_catalog_service(&config, &backend);
    let app = build_router(AppState::new(&config, service, backend.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, environment = config.environment.as_str(), store = ?backend.store(), "starting catalog server");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let StorageBackend::Postgres(pool) = backend {
        pool.close().await;
    }
    tracing::info!("catalog server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
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
                tracing::error!(error = %err, "failed to listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
