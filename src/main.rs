mod clients;
mod config;
mod filter;
mod helpers;
mod models;
mod nav;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use clients::ClusterClient;
use config::Config;

/// Read-only browser dashboard for pods, deployments and daemon sets.
#[derive(Debug, Parser)]
#[command(name = "kube-explorer", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overrides `listen_port` from the configuration
    #[arg(short = 'p', long)]
    listen_port: Option<u16>,
}

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ClusterClient>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("kube_explorer=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();

    let mut cfg = match cli.config {
        Some(ref path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("error loading config: {}", e);
            std::process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(port) = cli.listen_port {
        cfg.listen_port = port;
    }

    let client = ClusterClient::connect(&cfg.cluster)
        .await
        .unwrap_or_else(|e| {
            eprintln!("error configuring cluster access: {}", e);
            std::process::exit(1);
        });
    info!("using Kubernetes API at {}", client.base_url);

    let cfg = Arc::new(cfg);
    let state = AppState {
        client: Arc::new(client),
        config: cfg.clone(),
    };

    let router = routes::build_router(state);

    let listen_addr = cfg.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await.unwrap_or_else(|e| {
        eprintln!("failed to bind {}: {}", listen_addr, e);
        std::process::exit(1);
    });

    info!("kube-explorer listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            eprintln!("server error: {}", e);
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
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
    info!("shutting down");
}
