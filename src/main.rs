use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use billing_engine::config::{Config, LedgerBackend, LogFormat};
use billing_engine::core::{Clock, SystemClock};
use billing_engine::loans::{InMemoryLoanStore, LoanStore, MySqlLoanStore};
use billing_engine::middleware::{ErrorHandler, RequestId};
use billing_engine::AppServices;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// `RUST_LOG` wins over `LOG_LEVEL` when both are set
fn init_tracing(level: &str, format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("billing_engine={},actix_web=info", level).into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;

    init_tracing(&config.app.log_level, config.app.log_format);

    tracing::info!("Starting Billing Engine");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let store: Arc<dyn LoanStore> = match (&config.ledger.backend, &config.ledger.database) {
        (LedgerBackend::Mysql, Some(database)) => {
            let pool = database
                .create_pool()
                .await
                .context("Failed to create database pool")?;

            tracing::info!(
                "Database pool initialized ({} connections)",
                database.pool_size
            );

            if database.run_migrations {
                database
                    .run_migrations(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            Arc::new(MySqlLoanStore::new(pool))
        }
        (LedgerBackend::Mysql, None) => anyhow::bail!("DATABASE_URL is required for the mysql ledger"),
        (LedgerBackend::Memory, _) => {
            tracing::warn!("Using the in-memory ledger; data is lost on shutdown");
            Arc::new(InMemoryLoanStore::new())
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(
        SystemClock::new(config.app.utc_offset_hours).context("Invalid business timezone")?,
    );
    let services = AppServices::new(
        store,
        clock,
        config.app.currency,
        &config.app.audit_actor,
    );

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .wrap(Cors::permissive())
            .wrap(ErrorHandler)
            .wrap(RequestId)
            .wrap(TracingLogger::default())
            .configure(move |cfg| services.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("HTTP server terminated")?;
    Ok(())
}
