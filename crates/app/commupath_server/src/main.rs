//! CommuPath API server binary.
//!
//! Connects to PostgreSQL, runs migrations and serves the REST API until
//! interrupted.

use std::time::Duration;

use clap::Parser;
use commupath_api::config::ApiConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "commupath_server", version, about = "CommuPath API server")]
struct Args {
    /// Address to listen on.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8000")]
    bind: String,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/commupath"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Skip running embedded migrations at startup.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,commupath_api=debug,commupath_core=debug")),
        )
        .init();

    let args = Args::parse();

    info!(bind = %args.bind, max_connections = args.max_connections, "starting commupath_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    if args.skip_migrations {
        info!("skipping database migrations");
    } else {
        info!("running database migrations");
        commupath_api::migrate(&pool).await?;
    }

    let config = ApiConfig {
        bind_addr: args.bind,
        pg_connection_url: args.database_url,
        ..ApiConfig::from_env()
    };
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let app = commupath_api::router(commupath_api::AppState::new(pool, config));

    info!(addr = %local_addr, "REST API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
