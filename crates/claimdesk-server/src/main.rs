use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use claimdesk_server::{DocumentStore, Seed, router};

#[derive(Parser, Debug)]
#[command(name = "claimdesk-server", about = "REST backend for the claimdesk admin tool")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "CLAIMDESK_BIND", default_value = "127.0.0.1:3001")]
    bind: SocketAddr,

    /// JSON file with initial `articles` and `claims`
    #[arg(long, env = "CLAIMDESK_SEED")]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let store = match &args.seed {
        Some(path) => DocumentStore::from_seed_file(path)
            .with_context(|| format!("loading seed file {}", path.display()))?,
        None => {
            tracing::warn!("no seed file given, starting with an empty store");
            DocumentStore::new(Seed::default())
        }
    };

    let app = router(Arc::new(store));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("binding {}", args.bind))?;
    tracing::info!(addr = %args.bind, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
