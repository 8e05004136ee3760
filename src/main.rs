use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crew_lookup::config::{self, parse_db_path};
use crew_lookup::state::AppState;
use crew_lookup::{api, CrewStore};

#[derive(Parser)]
#[command(name = "crew-lookup")]
#[command(about = "Two-panel crew lookup over a read-only SQLite file", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the crew database file
    #[arg(value_hint = clap::ValueHint::FilePath, value_parser = parse_db_path)]
    db_path: PathBuf,

    /// Configuration file, created with defaults if missing
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Override the listen host
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crew_lookup=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let mut app_config = config::load_config(&cli.config).map_err(anyhow::Error::msg)?;
    if let Some(host) = cli.host {
        app_config.server.host = host;
    }
    if let Some(port) = cli.port {
        app_config.server.port = port;
    }

    let store = CrewStore::open(&cli.db_path, &app_config.database).await?;
    match store.count().await {
        Ok(count) => tracing::info!("Crew table has {} rows", count),
        Err(e) => tracing::warn!("Crew table is not readable yet: {}", e),
    }

    let state = Arc::new(AppState::new(Arc::new(store), &app_config.page));
    let app = api::router(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
