use crate::handlers::{self, AppState};
use crate::privacy;
use crate::webhook_handler;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Max request body: 1MB (contact forms and webhook events are small).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Per-IP rate limit applied to the public form routes.
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    pub per_second: u64,
    pub burst: u32,
}

/// Builds the application router.
///
/// `rate_limit` wraps the contact and privacy routes in a per-IP limiter. The limiter
/// needs the peer address, so the server must be started with connect info. Webhook
/// routes are never rate limited since every event comes from the platform's IPs.
pub fn build_router(
    state: Arc<AppState>,
    rate_limit: Option<RateLimit>,
) -> anyhow::Result<Router> {
    let mut public_routes: Router<Arc<AppState>> = Router::new()
        .route("/contact", post(handlers::submit_contact))
        .route("/api/contact", post(handlers::submit_contact))
        .route("/privacy", get(privacy::get_privacy))
        .route("/privacy/text", get(privacy::get_privacy_text));

    if let Some(limit) = rate_limit {
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .per_second(limit.per_second)
                .burst_size(limit.burst)
                .key_extractor(SmartIpKeyExtractor)
                .finish()
                .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
        );
        public_routes = public_routes.layer(GovernorLayer {
            config: governor_conf,
        });
    }
    // Request size limit (prevents memory exhaustion)
    let public_routes = public_routes.layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    let webhook_routes: Router<Arc<AppState>> = Router::new()
        .route(
            "/webhooks/whatsapp",
            get(webhook_handler::verify_whatsapp_webhook)
                .post(webhook_handler::receive_whatsapp_webhook),
        )
        .route(
            "/whatsapp",
            get(webhook_handler::verify_whatsapp_webhook)
                .post(webhook_handler::receive_legacy_whatsapp),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES));

    // Health check stays outside the limits
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(public_routes)
        .merge(webhook_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    Ok(app)
}
