use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

// ============ Database Models ============

/// The organization that owns website leads (tenant).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    /// Stable lookup key, configured via `LEAD_COMPANY_SLUG`.
    pub slug: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle status of a lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// First submission.
    New,
    /// The same email submitted the form again.
    Contacted,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
        }
    }

    /// Parses the stored representation, treating unknown values as `New`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "contacted" => LeadStatus::Contacted,
            _ => LeadStatus::New,
        }
    }
}

/// Follow-up priority derived from the lead score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

impl LeadPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadPriority::Low => "low",
            LeadPriority::Medium => "medium",
            LeadPriority::High => "high",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "high" => LeadPriority::High,
            "medium" => LeadPriority::Medium,
            _ => LeadPriority::Low,
        }
    }
}

impl fmt::Display for LeadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact-form submission stored for follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    /// Lower-cased and trimmed; unique per company.
    pub email: String,
    /// Company name typed by the visitor.
    pub company: String,
    pub website: Option<String>,
    pub pain_point: String,
    pub phone: Option<String>,
    pub source: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub page_url: Option<String>,
    pub ip_address: Option<String>,
    /// Time of the first submission.
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lead_score: u8,
    pub priority: LeadPriority,
    pub status: LeadStatus,
}

/// Raw `leads` row; status/priority are TEXT columns.
#[derive(Debug, Clone, FromRow)]
pub struct LeadRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub email: String,
    pub company_name: String,
    pub website: Option<String>,
    pub pain_point: String,
    pub phone: Option<String>,
    pub source: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub page_url: Option<String>,
    pub ip_address: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lead_score: i32,
    pub priority: String,
    pub status: String,
}

impl From<LeadRow> for Lead {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            email: row.email,
            company: row.company_name,
            website: row.website,
            pain_point: row.pain_point,
            phone: row.phone,
            source: row.source,
            utm_source: row.utm_source,
            utm_medium: row.utm_medium,
            utm_campaign: row.utm_campaign,
            utm_term: row.utm_term,
            utm_content: row.utm_content,
            user_agent: row.user_agent,
            referrer: row.referrer,
            page_url: row.page_url,
            ip_address: row.ip_address,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
            lead_score: row.lead_score.clamp(0, 100) as u8,
            priority: LeadPriority::parse(&row.priority),
            status: LeadStatus::parse(&row.status),
        }
    }
}

/// Validated, scored lead data ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub company: String,
    pub website: Option<String>,
    pub pain_point: String,
    pub phone: Option<String>,
    pub source: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub page_url: Option<String>,
    pub ip_address: Option<String>,
    pub lead_score: u8,
    pub priority: LeadPriority,
}

/// Whether an upsert inserted or updated the lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadAction {
    Created,
    Updated,
}

// ============ API Request/Response Models ============

/// Contact-form payload. Every field is optional here; validation reports what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    #[serde(alias = "painPoint")]
    pub pain_point: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    #[serde(alias = "utmSource")]
    pub utm_source: Option<String>,
    #[serde(alias = "utmMedium")]
    pub utm_medium: Option<String>,
    #[serde(alias = "utmCampaign")]
    pub utm_campaign: Option<String>,
    #[serde(alias = "utmTerm")]
    pub utm_term: Option<String>,
    #[serde(alias = "utmContent")]
    pub utm_content: Option<String>,
    #[serde(alias = "userAgent")]
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    #[serde(alias = "pageUrl")]
    pub page_url: Option<String>,
}

/// Request metadata taken from headers and the connection.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
    pub lead: Lead,
    pub action: LeadAction,
}
