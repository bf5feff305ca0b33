//! Shuttle booking server.
//!
//! Loads configuration from `SHUTTLE_BOOKING__*` variables, wires either
//! the PostgreSQL or the in-memory adapters, and serves the HTTP API.
//!
//! # Environment Variables
//!
//! - `SHUTTLE_BOOKING__SERVER__PORT`: listen port (default: 8080)
//! - `SHUTTLE_BOOKING__DATABASE__URL`: enables PostgreSQL storage
//! - `SHUTTLE_BOOKING__BOOKING__CHATS_FILE`: chat settings for in-memory runs
//! - `RUST_LOG`: overrides `server.log_level`

use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use shuttle_booking::adapters::http::{booking_routes, BookingApi};
use shuttle_booking::adapters::memory::{
    InMemoryChatDirectory, InMemoryRidershipLedger, InMemoryScheduleRepository,
    InMemorySessionStore,
};
use shuttle_booking::adapters::notify::{TracingNotifier, TracingSessionRenderer};
use shuttle_booking::adapters::postgres::{
    run_migrations, PostgresChatDirectory, PostgresRidershipLedger, PostgresScheduleRepository,
    PostgresSessionStore,
};
use shuttle_booking::application::{AppPorts, CommandDispatcher};
use shuttle_booking::config::{AppConfig, DatabaseConfig};
use shuttle_booking::domain::chat::ChatConfig;
use shuttle_booking::ports::ChatDirectory;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        in_memory = config.database.is_none(),
        "Starting shuttle booking server"
    );

    let ports = match &config.database {
        Some(database) => postgres_ports(database, &config).await?,
        None => memory_ports(&config).await?,
    };
    let dispatcher = Arc::new(CommandDispatcher::new(ports, config.booking.policy()));

    let app = booking_routes(
        BookingApi::new(dispatcher),
        config.server.request_timeout(),
    );

    let addr = config.server.socket_addr()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if config.features.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn postgres_ports(
    database: &DatabaseConfig,
    config: &AppConfig,
) -> Result<AppPorts, Box<dyn Error>> {
    let pool = database.pool_options().connect(&database.url).await?;
    info!("Connected to PostgreSQL");

    if database.run_migrations {
        run_migrations(&pool).await?;
        info!("Migrations applied");
    }

    let directory: Arc<dyn ChatDirectory> = Arc::new(PostgresChatDirectory::new(
        pool.clone(),
        config.booking.default_max_riders,
    ));

    Ok(AppPorts {
        schedules: Arc::new(PostgresScheduleRepository::new(pool.clone())),
        sessions: Arc::new(PostgresSessionStore::new(pool.clone())),
        ledger: Arc::new(PostgresRidershipLedger::new(pool)),
        directory: directory.clone(),
        notifier: Arc::new(TracingNotifier::new()),
        renderer: Arc::new(TracingSessionRenderer::new(directory)),
    })
}

async fn memory_ports(config: &AppConfig) -> Result<AppPorts, Box<dyn Error>> {
    let directory = InMemoryChatDirectory::new();

    if let Some(path) = &config.booking.chats_file {
        let raw = tokio::fs::read_to_string(path).await?;
        let chats: Vec<ChatConfig> = serde_json::from_str(&raw)?;
        info!(count = chats.len(), path = %path, "Seeding chat settings");
        for chat in chats {
            directory.register(chat).await;
        }
    }
    tracing::warn!("No database configured, all state is kept in memory");

    let directory: Arc<dyn ChatDirectory> = Arc::new(directory);

    Ok(AppPorts {
        schedules: Arc::new(InMemoryScheduleRepository::new()),
        sessions: Arc::new(InMemorySessionStore::new()),
        ledger: Arc::new(InMemoryRidershipLedger::new()),
        directory: directory.clone(),
        notifier: Arc::new(TracingNotifier::new()),
        renderer: Arc::new(TracingSessionRenderer::new(directory)),
    })
}
