use crate::errors::{AppError, ResultExt};
use crate::models::{Company, Lead, LeadAction, LeadRow, LeadStatus, NewLead};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Backing store for companies and their leads.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Looks up the tenant company by slug.
    async fn find_company(&self, slug: &str) -> Result<Option<Company>, AppError>;

    /// Inserts the lead, or updates the existing (company_id, email) lead and marks it
    /// contacted. Must be a single atomic operation.
    async fn upsert_lead(
        &self,
        company_id: Uuid,
        lead: NewLead,
    ) -> Result<(Lead, LeadAction), AppError>;
}

/// Postgres-backed lead store.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn find_company(&self, slug: &str) -> Result<Option<Company>, AppError> {
        sqlx::query_as::<_, Company>(
            "SELECT id, slug, name, created_at FROM companies WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("looking up company")
    }

    async fn upsert_lead(
        &self,
        company_id: Uuid,
        lead: NewLead,
    ) -> Result<(Lead, LeadAction), AppError> {
        // xmax = 0 only for freshly inserted rows
        let row = sqlx::query(
            r#"
            INSERT INTO leads (
                id, company_id, name, email, company_name, website, pain_point, phone,
                source, utm_source, utm_medium, utm_campaign, utm_term, utm_content,
                user_agent, referrer, page_url, ip_address, lead_score, priority, status,
                submitted_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8,
                $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, 'new',
                now(), now()
            )
            ON CONFLICT (company_id, email) DO UPDATE SET
                name = EXCLUDED.name,
                company_name = EXCLUDED.company_name,
                website = EXCLUDED.website,
                pain_point = EXCLUDED.pain_point,
                phone = EXCLUDED.phone,
                source = EXCLUDED.source,
                utm_source = EXCLUDED.utm_source,
                utm_medium = EXCLUDED.utm_medium,
                utm_campaign = EXCLUDED.utm_campaign,
                utm_term = EXCLUDED.utm_term,
                utm_content = EXCLUDED.utm_content,
                user_agent = EXCLUDED.user_agent,
                referrer = EXCLUDED.referrer,
                page_url = EXCLUDED.page_url,
                ip_address = EXCLUDED.ip_address,
                lead_score = EXCLUDED.lead_score,
                priority = EXCLUDED.priority,
                status = 'contacted',
                updated_at = now()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.company)
        .bind(&lead.website)
        .bind(&lead.pain_point)
        .bind(&lead.phone)
        .bind(&lead.source)
        .bind(&lead.utm_source)
        .bind(&lead.utm_medium)
        .bind(&lead.utm_campaign)
        .bind(&lead.utm_term)
        .bind(&lead.utm_content)
        .bind(&lead.user_agent)
        .bind(&lead.referrer)
        .bind(&lead.page_url)
        .bind(&lead.ip_address)
        .bind(i32::from(lead.lead_score))
        .bind(lead.priority.as_str())
        .fetch_one(&self.pool)
        .await
        .context("upserting lead")?;

        let inserted: bool = row.try_get("inserted").context("reading upsert result")?;
        let stored = LeadRow::from_row(&row).context("decoding lead row")?;

        let action = if inserted {
            LeadAction::Created
        } else {
            LeadAction::Updated
        };
        Ok((stored.into(), action))
    }
}

/// In-process lead store for local development and tests.
///
/// The write lock makes the lookup-then-write upsert atomic.
#[derive(Default)]
pub struct InMemoryLeadStore {
    companies: RwLock<Vec<Company>>,
    leads: RwLock<HashMap<(Uuid, String), Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a single company.
    pub fn with_company(slug: &str, name: &str) -> Self {
        Self {
            companies: RwLock::new(vec![Company {
                id: Uuid::new_v4(),
                slug: slug.to_string(),
                name: name.to_string(),
                created_at: Utc::now(),
            }]),
            leads: RwLock::default(),
        }
    }

    /// Snapshot of every stored lead.
    pub async fn leads(&self) -> Vec<Lead> {
        self.leads.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn find_company(&self, slug: &str) -> Result<Option<Company>, AppError> {
        Ok(self
            .companies
            .read()
            .await
            .iter()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn upsert_lead(
        &self,
        company_id: Uuid,
        lead: NewLead,
    ) -> Result<(Lead, LeadAction), AppError> {
        let mut leads = self.leads.write().await;
        let now = Utc::now();
        let key = (company_id, lead.email.clone());

        if let Some(existing) = leads.get_mut(&key) {
            let submitted_at = existing.submitted_at;
            let id = existing.id;
            *existing = into_lead(id, company_id, lead, submitted_at, now, LeadStatus::Contacted);
            return Ok((existing.clone(), LeadAction::Updated));
        }

        let stored = into_lead(Uuid::new_v4(), company_id, lead, now, now, LeadStatus::New);
        leads.insert(key, stored.clone());
        Ok((stored, LeadAction::Created))
    }
}

fn into_lead(
    id: Uuid,
    company_id: Uuid,
    lead: NewLead,
    submitted_at: chrono::DateTime<Utc>,
    updated_at: chrono::DateTime<Utc>,
    status: LeadStatus,
) -> Lead {
    Lead {
        id,
        company_id,
        name: lead.name,
        email: lead.email,
        company: lead.company,
        website: lead.website,
        pain_point: lead.pain_point,
        phone: lead.phone,
        source: lead.source,
        utm_source: lead.utm_source,
        utm_medium: lead.utm_medium,
        utm_campaign: lead.utm_campaign,
        utm_term: lead.utm_term,
        utm_content: lead.utm_content,
        user_agent: lead.user_agent,
        referrer: lead.referrer,
        page_url: lead.page_url,
        ip_address: lead.ip_address,
        submitted_at,
        updated_at,
        lead_score: lead.lead_score,
        priority: lead.priority,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadPriority;

    fn new_lead(email: &str, score: u8) -> NewLead {
        NewLead {
            name: "Ana".into(),
            email: email.into(),
            company: "Acme".into(),
            website: None,
            pain_point: "CRM".into(),
            phone: None,
            source: "website".into(),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            utm_term: None,
            utm_content: None,
            user_agent: None,
            referrer: None,
            page_url: None,
            ip_address: None,
            lead_score: score,
            priority: crate::lead_scoring::priority_for(score),
        }
    }

    #[tokio::test]
    async fn test_seeded_company_is_found() {
        let store = InMemoryLeadStore::with_company("acme", "Acme Consulting");

        let company = store.find_company("acme").await.unwrap().unwrap();
        assert_eq!(company.name, "Acme Consulting");
        assert!(store.find_company("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = InMemoryLeadStore::with_company("acme", "Acme");
        let company = store.find_company("acme").await.unwrap().unwrap();

        let (first, action) = store
            .upsert_lead(company.id, new_lead("ana@example.com", 50))
            .await
            .unwrap();
        assert_eq!(action, LeadAction::Created);
        assert_eq!(first.status, LeadStatus::New);

        let (second, action) = store
            .upsert_lead(company.id, new_lead("ana@example.com", 85))
            .await
            .unwrap();
        assert_eq!(action, LeadAction::Updated);
        assert_eq!(second.status, LeadStatus::Contacted);
        assert_eq!(second.id, first.id);
        assert_eq!(second.submitted_at, first.submitted_at);
        assert_eq!(second.priority, LeadPriority::High);
        assert_eq!(store.leads().await.len(), 1);
    }

    #[tokio::test]
    async fn test_same_email_in_other_company_is_a_new_lead() {
        let store = InMemoryLeadStore::new();

        store.upsert_lead(Uuid::new_v4(), new_lead("ana@example.com", 50)).await.unwrap();
        let (_, action) = store
            .upsert_lead(Uuid::new_v4(), new_lead("ana@example.com", 50))
            .await
            .unwrap();

        assert_eq!(action, LeadAction::Created);
        assert_eq!(store.leads().await.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_identical_submissions_keep_one_row() {
        let store = std::sync::Arc::new(InMemoryLeadStore::new());
        let company_id = Uuid::new_v4();

        let mut handles = vec![];
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .upsert_lead(company_id, new_lead("same@example.com", 60))
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            let (_, action) = handle.await.unwrap().unwrap();
            if action == LeadAction::Created {
                created += 1;
            }
        }

        assert_eq!(created, 1);
        assert_eq!(store.leads().await.len(), 1);
    }
}
