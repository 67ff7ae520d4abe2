//! WhatsApp webhook handshake and payload signature checks.

use crate::config::WhatsAppConfig;
use crate::errors::AppError;
use crate::webhook_models::HandshakeQuery;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying `sha256=<hex>` of the raw request body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Answers the subscription handshake.
///
/// Returns the challenge to echo when `hub.mode` is "subscribe" and the token matches
/// the configured one. A missing configured token refuses every handshake.
pub fn verify_handshake(query: &HandshakeQuery, expected_token: Option<&str>) -> Option<String> {
    let expected = expected_token?;
    if query.mode.as_deref() != Some("subscribe") {
        return None;
    }
    let token = query.verify_token.as_deref()?;
    if !bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        return None;
    }
    query.challenge.clone()
}

/// Checks a `sha256=<hex>` signature against the HMAC-SHA256 of `body`.
pub fn verify_signature(app_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_sig) = signature_header.trim().strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(app_secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    // verify_slice compares in constant time
    mac.verify_slice(&expected).is_ok()
}

/// Hex signature for `body`, as the platform would send it.
pub fn sign(app_secret: &str, body: &[u8]) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(app_secret.as_bytes())
        .map_err(|e| AppError::InternalError(format!("Invalid HMAC key: {}", e)))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// How a webhook request passed authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Verified,
    /// No app secret configured and unsigned requests explicitly allowed.
    Bypassed,
}

/// Applies the signature policy to an inbound webhook request.
///
/// - app secret configured: the header must be present and valid
/// - no app secret: rejected unless `allow_unsigned` is set, then accepted with a warning
pub fn authenticate_webhook(
    config: &WhatsAppConfig,
    body: &[u8],
    signature_header: Option<&str>,
) -> Result<SignatureCheck, AppError> {
    let Some(ref app_secret) = config.app_secret else {
        if config.allow_unsigned {
            tracing::warn!(
                "⚠️  Accepting unsigned WhatsApp webhook (WHATSAPP_APP_SECRET not set, WHATSAPP_ALLOW_UNSIGNED=true)"
            );
            return Ok(SignatureCheck::Bypassed);
        }
        return Err(AppError::Unauthorized(
            "WHATSAPP_APP_SECRET not configured; unsigned webhooks are rejected".to_string(),
        ));
    };

    let signature = signature_header.ok_or_else(|| {
        AppError::Unauthorized(format!("Missing {} header", SIGNATURE_HEADER))
    })?;

    if !verify_signature(app_secret, body, signature) {
        return Err(AppError::Unauthorized(
            "Invalid webhook signature".to_string(),
        ));
    }

    tracing::debug!("✓ Webhook signature verified");
    Ok(SignatureCheck::Verified)
}
