use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query parameters of the webhook handshake (`GET`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandshakeQuery {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// WhatsApp Business webhook notification.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookNotification {
    /// Usually "whatsapp_business_account"
    #[serde(default)]
    pub object: Option<String>,

    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

impl WebhookNotification {
    /// All inbound messages across entries and changes, in delivery order.
    pub fn messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter_map(|change| change.value.as_ref())
            .flat_map(|value| value.messages.iter())
    }

    /// Number of delivery/read status callbacks across entries and changes.
    pub fn status_count(&self) -> usize {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .filter_map(|change| change.value.as_ref())
            .map(|value| value.statuses.len())
            .sum()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEntry {
    /// WhatsApp Business Account id
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: Option<String>,

    pub value: Option<WebhookChangeValue>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookChangeValue {
    #[serde(default)]
    pub messaging_product: Option<String>,

    #[serde(default)]
    pub metadata: Option<WebhookMetadata>,

    /// Absent on status callbacks (sent/delivered/read)
    #[serde(default)]
    pub messages: Vec<InboundMessage>,

    /// Raw statuses (sent/delivered/read); only counted
    #[serde(default)]
    pub statuses: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookMetadata {
    pub display_phone_number: Option<String>,
    pub phone_number_id: Option<String>,
}

/// A single inbound message. Consumed once, never persisted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InboundMessage {
    /// Sender's WhatsApp id (phone number without '+')
    pub from: String,
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextBody>,
}

impl InboundMessage {
    /// The text body, for `type == "text"` messages only.
    pub fn text_body(&self) -> Option<&str> {
        if self.kind != "text" {
            return None;
        }
        self.text.as_ref().map(|t| t.body.as_str())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextBody {
    pub body: String,
}

/// Outcome of one webhook call, logged by the handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub received: usize,
    pub replied: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}
