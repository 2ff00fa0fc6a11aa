mod actions;
mod api;
mod backend;
mod catalog;
mod config;
mod intent;
mod page;
mod preprocess;
mod relay;
mod sdk;
mod server;
mod session;
mod surface;

use crate::backend::{BackendHost, backend_from_config};
use crate::catalog::CertificateCatalog;
use crate::config::AppConfig;
use crate::page::ChatPage;
use crate::server::AppState;
use crate::session::InMemorySessionManager;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "certdesk-gui", version, about = "Certificate desk chat GUI server")]
struct Cli {
    /// TOML file layered over the environment configuration.
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Override the bind address.
    #[arg(long)]
    bind: Option<SocketAddr>,
    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let page = ChatPage::load(config.page_path.as_deref(), &config.sidebar_selector).await?;
    let catalog = CertificateCatalog::load_or_empty(&config.catalog_path);
    let sessions = Arc::new(InMemorySessionManager::new(config.session_ttl));
    let backend = BackendHost::new(backend_from_config(config.backend.as_ref()));

    let addr: SocketAddr = config.bind_addr;
    let state = AppState::new(config, page, sessions, backend, catalog);
    tracing::info!(%addr, "starting certdesk-gui server");
    server::run(addr, state).await?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
