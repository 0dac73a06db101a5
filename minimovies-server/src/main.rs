//! # MiniMovies server
//!
//! Serves the watch-progress and review endpoints over HTTP, backed by
//! PostgreSQL or, with `--ephemeral`, by an in-memory demo store.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use minimovies_core::{
    AppUnitOfWork,
    database::{InMemoryStore, PostgresDatabase, postgres::PoolSettings},
};
use minimovies_server::{AppState, create_app, infra::config::Config};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "minimovies-server")]
#[command(about = "Watch-progress tracking and review aggregation for MiniMovies")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Serve from an in-memory store seeded with demo data
    #[arg(long, env = "MINIMOVIES_EPHEMERAL", default_value_t = false)]
    ephemeral: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("invalid configuration")?;
    init_tracing();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        let db = connect_postgres(&config).await?;
        db.migrate().await.context("failed to apply migrations")?;
        info!("Database migrations applied");
        return Ok(());
    }

    apply_overrides(&mut config, &cli.serve);
    run_server(config).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn apply_overrides(config: &mut Config, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.server_host = host.clone();
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if args.ephemeral {
        config.ephemeral = true;
    }
}

async fn connect_postgres(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let database_url = config.require_database_url()?;
    let settings = PoolSettings {
        max_connections: config.db_max_connections,
        ..PoolSettings::default()
    };
    PostgresDatabase::connect(database_url, settings)
        .await
        .context("failed to connect to PostgreSQL")
}

async fn build_unit_of_work(config: &Config) -> anyhow::Result<AppUnitOfWork> {
    if config.ephemeral {
        let (store, seed) = InMemoryStore::with_demo_data().await;
        warn!("Running with the in-memory store; data is lost on exit");
        info!(
            user_id = %seed.user_id,
            movie_id = %seed.movie_id,
            token = %seed.session_token,
            "Demo viewer ready"
        );
        return Ok(AppUnitOfWork::from_memory(Arc::new(store)));
    }

    let db = connect_postgres(config).await?;
    db.migrate().await.context("failed to apply migrations")?;
    Ok(AppUnitOfWork::from_postgres(&db))
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server_host, config.server_port
            )
        })?;

    let unit_of_work = build_unit_of_work(&config).await?;
    info!(?unit_of_work, "Persistence ready");

    let state = AppState::new(unit_of_work, config);
    let shutdown = CancellationToken::new();
    let sweeper = state.viewing_sessions.clone().spawn_idle_sweeper(
        state.config().viewing_sessions.sweep_interval,
        shutdown.clone(),
    );
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown.cancel();
    if let Err(error) = sweeper.await {
        warn!(%error, "viewing session sweeper failed");
    }
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
