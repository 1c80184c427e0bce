//! Tournament sign-up server.
//!
//! Serves the JSON API over PostgreSQL (or process memory with `--in-memory`)
//! and verifies the identity provider's bearer tokens.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use log::info;
use pico_args::Arguments;
use tm_server::{
    api,
    config::{CliOverrides, ServerConfig, StorageBackend},
    logging, metrics,
};
use tournamate::{
    auth::TokenVerifier,
    db::{Database, Repositories},
    events::{EventPublisher, LogPublisher, WebhookPublisher},
    tournament::CodeAllocator,
};

const HELP: &str = "\
Run the tournament sign-up server

USAGE:
  tm_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --in-memory              Keep all data in process memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORAGE_BACKEND          postgres or memory
  DATABASE_URL             PostgreSQL connection string
  DB_AUTO_MIGRATE          Apply the schema at startup [default: true]
  JWT_SECRET               Identity provider HS256 secret (required, >= 32 chars)
  JWT_AUDIENCE             Expected token audience
  CODE_MAX_ATTEMPTS        Registration code attempts [default: 10]
  CODE_RETRY_BACKOFF_MS    Backoff step between code attempts [default: 0]
  WEBHOOK_URL              Automation webhook receiving domain events
  WEBHOOK_SECRET           Bearer token sent to the webhook
  WEBHOOK_TIMEOUT_MS       Webhook request timeout [default: 3000]
  CHAT_MAX_MESSAGE_LEN     Longest chat message [default: 1000]
  METRICS_BIND             Prometheus exporter address
  (See .env.example for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let overrides = CliOverrides {
        bind: pargs
            .opt_value_from_str::<_, SocketAddr>("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs
            .opt_value_from_str("--db-url")
            .context("Invalid --db-url")?,
        in_memory: pargs.contains("--in-memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(overrides)?;
    config.validate()?;

    info!("Starting tournament server at {}", config.bind);

    if let Some(addr) = config.metrics_bind {
        metrics::init_metrics(addr).map_err(Error::msg)?;
        info!("Prometheus metrics exposed at http://{}/metrics", addr);
    }

    // Storage
    let (repos, database) = match config.storage {
        StorageBackend::Memory => {
            log::warn!("Using in-memory storage; data is lost on shutdown");
            (Repositories::in_memory(), None)
        }
        StorageBackend::Postgres => {
            info!("Connecting to database");
            let db = Database::new(&config.database)
                .await
                .context("Failed to connect to database")?;
            if config.auto_migrate {
                db.ensure_schema()
                    .await
                    .context("Failed to apply database schema")?;
                info!("Database schema is up to date");
            }
            info!("Database connected successfully");
            (db.repositories(), Some(db))
        }
    };

    // Domain events
    let publisher: Arc<dyn EventPublisher> = match &config.webhook {
        Some(webhook) => {
            info!("Publishing domain events to {}", webhook.url);
            Arc::new(WebhookPublisher::new(
                webhook.url.clone(),
                webhook.secret.clone(),
                webhook.timeout,
            )?)
        }
        None => Arc::new(LogPublisher),
    };

    let verifier = TokenVerifier::new(&config.auth.jwt_secret, config.auth.jwt_audience.clone())?;

    let state = api::AppState::new(
        &repos,
        publisher,
        verifier,
        CodeAllocator::new(config.codes),
        config.chat_max_message_len,
    );
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
        std::future::pending::<()>().await;
    }
}
