use crate::config::Config;
use crate::errors::AppError;
use crate::intake::build_lead;
use crate::lead_store::LeadStore;
use crate::models::{ContactResponse, ContactSubmission, LeadAction, RequestContext};
use crate::whatsapp_client::WhatsAppClient;
use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use moka::future::Cache;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How long a processed WhatsApp message id is remembered.
const MESSAGE_DEDUP_TTL: Duration = Duration::from_secs(600);

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Backing store for companies and leads.
    pub lead_store: Arc<dyn LeadStore>,
    /// Client for the WhatsApp Cloud API (optional).
    pub whatsapp_client: Option<WhatsAppClient>,
    /// Message ids already handled, to ignore platform redeliveries.
    pub processed_messages: Cache<String, ()>,
}

impl AppState {
    pub fn new(
        config: Config,
        lead_store: Arc<dyn LeadStore>,
        whatsapp_client: Option<WhatsAppClient>,
    ) -> Self {
        let processed_messages = Cache::builder()
            .time_to_live(MESSAGE_DEDUP_TTL)
            .max_capacity(10_000)
            .build();

        Self {
            config,
            lead_store,
            whatsapp_client,
            processed_messages,
        }
    }

    /// Records a message id. Returns `false` if it was already recorded.
    pub async fn mark_message_seen(&self, message_id: &str) -> bool {
        self.processed_messages
            .entry(message_id.to_string())
            .or_insert(())
            .await
            .is_fresh()
    }
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-leads-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /contact
///
/// Validates a contact-form submission, scores it and upserts it for the configured
/// company. A repeated email updates the existing lead and marks it contacted.
///
/// # Returns
///
/// * `201` with `action: "created"` for a new lead, `200` with `action: "updated"`
///   for a resubmission, or a `{success: false, error}` body.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    payload: Result<Json<ContactSubmission>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let Json(submission) = payload.map_err(|rejection| {
        AppError::ValidationError(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    let context = request_context(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let new_lead = build_lead(submission, context)?;

    tracing::info!(
        "POST /contact - email: {}, score: {}, priority: {}",
        new_lead.email,
        new_lead.lead_score,
        new_lead.priority
    );

    let slug = &state.config.company_slug;
    let company = state
        .lead_store
        .find_company(slug)
        .await?
        .ok_or_else(|| {
            AppError::ConfigurationError(format!("Company '{}' not found in lead store", slug))
        })?;

    let (lead, action) = state.lead_store.upsert_lead(company.id, new_lead).await?;

    let (status, message) = match action {
        LeadAction::Created => {
            tracing::info!("✅ New lead {} created for company {}", lead.id, company.slug);
            (
                StatusCode::CREATED,
                "Thanks! We received your message and will get back to you soon.",
            )
        }
        LeadAction::Updated => {
            tracing::info!("✓ Existing lead {} updated (contacted)", lead.id);
            (
                StatusCode::OK,
                "Thanks! We updated your request and will get back to you soon.",
            )
        }
    };

    Ok((
        status,
        Json(ContactResponse {
            success: true,
            message: message.to_string(),
            lead,
            action,
        }),
    ))
}

/// Collects user agent, referrer and client IP from the request.
///
/// Proxy headers take precedence over the socket address.
pub fn request_context(headers: &HeaderMap, peer: Option<SocketAddr>) -> RequestContext {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_str("x-real-ip"))
        .or_else(|| header_str("fly-client-ip"))
        .or_else(|| peer.map(|addr| addr.ip().to_string()));

    RequestContext {
        user_agent: header_str(header::USER_AGENT.as_str()),
        referrer: header_str(header::REFERER.as_str()),
        ip_address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_context_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let context = request_context(&headers, Some(peer));

        assert_eq!(context.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(context.user_agent.as_deref(), Some("curl/8.0"));
        assert!(context.referrer.is_none());
    }

    #[test]
    fn test_request_context_falls_back_to_peer() {
        let peer: SocketAddr = "192.0.2.10:5555".parse().unwrap();
        let context = request_context(&HeaderMap::new(), Some(peer));
        assert_eq!(context.ip_address.as_deref(), Some("192.0.2.10"));

        let context = request_context(&HeaderMap::new(), None);
        assert!(context.ip_address.is_none());
    }

    #[tokio::test]
    async fn test_mark_message_seen_once() {
        let config = Config::from_pairs(&[]).unwrap();
        let store = Arc::new(crate::lead_store::InMemoryLeadStore::new());
        let state = AppState::new(config, store, None);

        assert!(state.mark_message_seen("wamid.1").await);
        assert!(!state.mark_message_seen("wamid.1").await);
        assert!(state.mark_message_seen("wamid.2").await);
    }
}
