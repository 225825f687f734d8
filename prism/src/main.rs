#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use prism_config::Config;
use prism_server::Server;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = Config::load(&args.config)?;
    if let Some(listen) = args.listen {
        config.server.listen_address = Some(listen);
    }

    tracing::info!(
        config_path = %args.config.display(),
        "starting prism"
    );

    let server = Server::new(&config)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("prism stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
