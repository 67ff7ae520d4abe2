use std::env;
use uuid::Uuid;

use rust_leads_api::core::intake::build_lead;
use rust_leads_api::core::models::{ContactSubmission, LeadAction, LeadStatus, RequestContext};
use rust_leads_api::db::Database;
use rust_leads_api::integrations::lead_store::{LeadStore, PgLeadStore};

/// Integration smoke test for the Postgres lead upsert.
/// Marked ignored to avoid running against production by accident; set TEST_DATABASE_URL to run.
#[tokio::test]
#[ignore]
async fn upsert_lead_smoke_test() -> anyhow::Result<()> {
    let db_url = env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .map_err(|_| anyhow::anyhow!("Set TEST_DATABASE_URL or DATABASE_URL to run this test"))?;

    let db = Database::new(&db_url).await?;

    // Unique slug so repeated runs don't collide.
    let slug = format!("test-{}", Uuid::new_v4());
    sqlx::query("INSERT INTO companies (id, slug, name) VALUES ($1, $2, $3)")
        .bind(Uuid::new_v4())
        .bind(&slug)
        .bind("Test Company")
        .execute(&db.pool)
        .await?;

    let store = PgLeadStore::new(db.pool.clone());
    let company = store
        .find_company(&slug)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .ok_or_else(|| anyhow::anyhow!("company {} not found", slug))?;

    let submission = |pain_point: &str| ContactSubmission {
        name: Some("Smoke Test".into()),
        email: Some("Smoke@Example.com".into()),
        company: Some("Smoke Co".into()),
        pain_point: Some(pain_point.into()),
        ..Default::default()
    };

    let first = build_lead(submission("Queremos un dashboard"), RequestContext::default())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (created, action) = store
        .upsert_lead(company.id, first)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(action, LeadAction::Created);
    assert_eq!(created.status, LeadStatus::New);
    assert_eq!(created.email, "smoke@example.com");

    let second = build_lead(submission("Ahora un CRM"), RequestContext::default())
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let (updated, action) = store
        .upsert_lead(company.id, second)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    assert_eq!(action, LeadAction::Updated);
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.status, LeadStatus::Contacted);
    assert_eq!(updated.pain_point, "Ahora un CRM");

    Ok(())
}
