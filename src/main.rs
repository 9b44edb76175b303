use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pantry_api::app::{self, AppState};
use pantry_api::config::AppConfig;
use pantry_api::database::DatabaseManager;

#[derive(Parser, Debug)]
#[command(name = "pantry-api", version, about = "Recipe and cocktail catalog API")]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Apply pending database migrations before serving
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pantry_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    config.log_summary();

    // Lazy pool: the server starts even when Postgres is down, /health reports it
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    if cli.migrate {
        DatabaseManager::run_migrations(&pool)
            .await
            .context("failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let state = AppState::from_config(pool, &config)?;
    let router = app::router(state, &config.security.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Pantry API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
