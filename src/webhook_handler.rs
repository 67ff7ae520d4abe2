use crate::dispatcher::ReplyCatalog;
use crate::errors::AppError;
use crate::handlers::AppState;
use crate::webhook_models::{DispatchSummary, HandshakeQuery, WebhookNotification};
use crate::webhook_verifier::{authenticate_webhook, verify_handshake, SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /webhooks/whatsapp (and legacy GET /whatsapp)
///
/// Subscription handshake: echoes `hub.challenge` when the mode is "subscribe" and
/// the verify token matches, otherwise 403. An unparseable query string is a failed
/// handshake too.
pub async fn verify_whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HandshakeQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            return AppError::Forbidden(format!(
                "WhatsApp handshake query rejected: {}",
                rejection.body_text()
            ))
            .into_plain_response();
        }
    };

    match verify_handshake(&query, state.config.whatsapp.verify_token.as_deref()) {
        Some(challenge) => {
            tracing::info!("✓ WhatsApp webhook handshake verified");
            plain_text(StatusCode::OK, challenge)
        }
        None => {
            AppError::Forbidden(format!(
                "WhatsApp handshake rejected (mode={:?})",
                query.mode
            ))
            .into_plain_response()
        }
    }
}

/// POST /webhooks/whatsapp
///
/// Verifies the payload signature, then answers every new inbound text message with
/// a canned reply. Redelivered message ids are ignored.
pub async fn receive_whatsapp_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::info!("Received WhatsApp webhook");

    match process_notification(&state, &headers, &body, &ReplyCatalog::STANDARD, true).await {
        Ok(_) => plain_text(StatusCode::OK, "OK"),
        Err(e) => e.into_plain_response(),
    }
}

/// POST /whatsapp
///
/// Legacy variant: same signature policy, legacy reply catalog, no de-duplication.
pub async fn receive_legacy_whatsapp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    tracing::info!("Received WhatsApp webhook on legacy route");

    match process_notification(&state, &headers, &body, &ReplyCatalog::LEGACY, false).await {
        Ok(_) => plain_text(StatusCode::OK, "EVENT_RECEIVED"),
        Err(e) => e.into_plain_response(),
    }
}

/// verify signature → parse → iterate entries/changes/messages → dispatch.
///
/// Reply failures are logged and counted, never retried and never fail the request.
pub async fn process_notification(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
    catalog: &ReplyCatalog,
    deduplicate: bool,
) -> Result<DispatchSummary, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    authenticate_webhook(&state.config.whatsapp, body, signature)?;

    let notification: WebhookNotification = serde_json::from_slice(body).map_err(|e| {
        AppError::InternalError(format!("Failed to parse WhatsApp webhook payload: {}", e))
    })?;

    let mut summary = DispatchSummary::default();

    let statuses = notification.status_count();
    if statuses > 0 {
        tracing::debug!("WhatsApp webhook carried {} status callback(s)", statuses);
    }

    for message in notification.messages() {
        summary.received += 1;

        if deduplicate && !state.mark_message_seen(&message.id).await {
            tracing::debug!("Skipped duplicate WhatsApp message {}", message.id);
            summary.duplicates += 1;
            continue;
        }

        let Some(text) = message.text_body() else {
            tracing::debug!(
                "Skipped non-text WhatsApp message {} (type={})",
                message.id,
                message.kind
            );
            summary.skipped += 1;
            continue;
        };

        let reply = catalog.dispatch(text);
        tracing::info!(
            "WhatsApp message {} from {} routed to {:?}",
            message.id,
            message.from,
            reply.category
        );

        let Some(ref client) = state.whatsapp_client else {
            tracing::warn!(
                "WhatsApp client not configured - reply to {} not sent: {}",
                message.from,
                reply.body
            );
            summary.skipped += 1;
            continue;
        };

        match client.send_text(&message.from, &reply.body).await {
            Ok(()) => summary.replied += 1,
            Err(e) => {
                tracing::error!("Failed to send WhatsApp reply to {}: {}", message.from, e);
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        "WhatsApp webhook complete: {} received, {} replied, {} duplicates, {} skipped, {} failed",
        summary.received,
        summary.replied,
        summary.duplicates,
        summary.skipped,
        summary.failed
    );

    Ok(summary)
}

fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body.into(),
    )
        .into_response()
}
