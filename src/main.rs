use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_leads_api::config::Config;
use rust_leads_api::db::Database;
use rust_leads_api::handlers::AppState;
use rust_leads_api::lead_store::{InMemoryLeadStore, LeadStore, PgLeadStore};
use rust_leads_api::routes::{build_router, RateLimit};
use rust_leads_api::whatsapp_client::WhatsAppClient;

/// Main entry point for the application.
///
/// This function initializes:
/// - Logging and tracing.
/// - Configuration loading.
/// - The lead store (Postgres, or in-memory when no database is configured).
/// - The WhatsApp Cloud API client.
/// - HTTP routes and middleware (CORS, body limit, rate limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_leads_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let lead_store: Arc<dyn LeadStore> = match config.database_url {
        Some(ref url) => {
            let db = Database::new(url).await?;
            tracing::info!("Database connection pool established, migrations applied");
            Arc::new(PgLeadStore::new(db.pool))
        }
        None => {
            tracing::warn!(
                "⚠️  Using in-memory lead store seeded with company '{}' - leads are lost on restart",
                config.company_slug
            );
            Arc::new(InMemoryLeadStore::with_company(
                &config.company_slug,
                &config.company_name,
            ))
        }
    };

    let whatsapp_client = match WhatsAppClient::from_config(
        &config.whatsapp,
        Duration::from_secs(config.http_timeout_secs),
    ) {
        Ok(Some(client)) => {
            tracing::info!("✓ WhatsApp client initialized: {}", client.messages_url());
            Some(client)
        }
        Ok(None) => None,
        Err(e) => {
            tracing::error!("Failed to initialize WhatsApp client: {}", e);
            None
        }
    };

    let rate_limit = RateLimit {
        per_second: config.rate_limit_per_second,
        burst: config.rate_limit_burst,
    };
    let addr = format!("0.0.0.0:{}", config.port);

    // Build application state
    let app_state = Arc::new(AppState::new(config, lead_store, whatsapp_client));
    let app = build_router(app_state, Some(rate_limit))?;

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
