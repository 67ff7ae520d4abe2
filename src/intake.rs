//! Contact-form validation and lead construction.
//!
//! Turns a raw [`ContactSubmission`] plus request metadata into a scored [`NewLead`]:
//! 1. Trim every field, drop blank optional fields
//! 2. Check required fields (name, email, company, pain point) and lengths
//! 3. Validate and normalise the email
//! 4. Compute score and priority
use crate::errors::AppError;
use crate::lead_scoring::{priority_for, score_lead, ScoreSignals};
use crate::models::{ContactSubmission, NewLead, RequestContext};
use crate::normalize::non_blank;
use regex::Regex;
use std::sync::LazyLock;

const MAX_NAME_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;
const MAX_PAIN_POINT_LEN: usize = 5000;
const MAX_FIELD_LEN: usize = 2048;

const DEFAULT_SOURCE: &str = "website";

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Basic email shape check: `local@domain.tld` without whitespace.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Lower-cases and trims an email for uniqueness comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates a submission and builds the scored lead.
pub fn build_lead(
    submission: ContactSubmission,
    context: RequestContext,
) -> Result<NewLead, AppError> {
    let name = non_blank(submission.name);
    let email = non_blank(submission.email).map(|e| normalize_email(&e));
    let company = non_blank(submission.company);
    let pain_point = non_blank(submission.pain_point);

    let missing: Vec<&str> = [
        ("name", name.is_none()),
        ("email", email.is_none()),
        ("company", company.is_none()),
        ("painPoint", pain_point.is_none()),
    ]
    .iter()
    .filter(|(_, absent)| *absent)
    .map(|(field, _)| *field)
    .collect();

    // All four are Some past this point
    let (Some(name), Some(email), Some(company), Some(pain_point)) =
        (name, email, company, pain_point)
    else {
        return Err(AppError::ValidationError(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    };

    check_len("name", &name, MAX_NAME_LEN)?;
    check_len("company", &company, MAX_NAME_LEN)?;
    check_len("email", &email, MAX_EMAIL_LEN)?;
    check_len("painPoint", &pain_point, MAX_PAIN_POINT_LEN)?;

    if !is_valid_email(&email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    let website = optional_field("website", submission.website)?;
    let phone = optional_field("phone", submission.phone)?;
    let source = optional_field("source", submission.source)?
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    let utm_source = optional_field("utm_source", submission.utm_source)?;
    let utm_medium = optional_field("utm_medium", submission.utm_medium)?;
    let utm_campaign = optional_field("utm_campaign", submission.utm_campaign)?;
    let utm_term = optional_field("utm_term", submission.utm_term)?;
    let utm_content = optional_field("utm_content", submission.utm_content)?;
    let page_url = optional_field("pageUrl", submission.page_url)?;
    // Payload values win over headers
    let user_agent = optional_field("userAgent", submission.user_agent.or(context.user_agent))?;
    let referrer = optional_field("referrer", submission.referrer.or(context.referrer))?;

    let lead_score = score_lead(&ScoreSignals {
        has_website: website.is_some(),
        has_phone: phone.is_some(),
        has_utm_source: utm_source.is_some(),
        has_utm_campaign: utm_campaign.is_some(),
        pain_point: &pain_point,
    });
    let priority = priority_for(lead_score);

    tracing::debug!(
        "Scored lead {}: score={}, priority={}",
        email,
        lead_score,
        priority
    );

    Ok(NewLead {
        name,
        email,
        company,
        website,
        pain_point,
        phone,
        source,
        utm_source,
        utm_medium,
        utm_campaign,
        utm_term,
        utm_content,
        user_agent,
        referrer,
        page_url,
        ip_address: non_blank(context.ip_address),
        lead_score,
        priority,
    })
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), AppError> {
    if value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "Field '{}' exceeds {} characters",
            field, max
        )));
    }
    Ok(())
}

fn optional_field(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    let value = non_blank(value);
    if let Some(ref v) = value {
        check_len(field, v, MAX_FIELD_LEN)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadPriority;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: Some("  Ana Pérez ".into()),
            email: Some(" Ana@Example.COM ".into()),
            company: Some("Acme".into()),
            pain_point: Some("Queremos automatizar la facturación".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_submission_is_normalised_and_scored() {
        let lead = build_lead(submission(), RequestContext::default()).unwrap();

        assert_eq!(lead.name, "Ana Pérez");
        assert_eq!(lead.email, "ana@example.com");
        assert_eq!(lead.source, "website");
        assert_eq!(lead.lead_score, 65);
        assert_eq!(lead.priority, LeadPriority::Medium);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut sub = submission();
        sub.email = Some("   ".into());
        sub.pain_point = None;

        let err = build_lead(sub, RequestContext::default()).unwrap_err();
        match err {
            AppError::ValidationError(msg) => {
                assert_eq!(msg, "Missing required fields: email, painPoint")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_email_is_rejected() {
        for bad in ["not-an-email", "a@b", "a b@example.com", "@example.com"] {
            let mut sub = submission();
            sub.email = Some(bad.into());
            assert!(
                matches!(
                    build_lead(sub, RequestContext::default()),
                    Err(AppError::ValidationError(_))
                ),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_overlong_field_is_rejected() {
        let mut sub = submission();
        sub.website = Some("x".repeat(MAX_FIELD_LEN + 1));
        assert!(build_lead(sub, RequestContext::default()).is_err());
    }

    #[test]
    fn test_headers_fill_missing_metadata() {
        let context = RequestContext {
            user_agent: Some("Mozilla/5.0".into()),
            referrer: Some("https://google.com".into()),
            ip_address: Some("203.0.113.9".into()),
        };
        let mut sub = submission();
        sub.referrer = Some("https://linkedin.com".into());

        let lead = build_lead(sub, context).unwrap();
        assert_eq!(lead.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(lead.referrer.as_deref(), Some("https://linkedin.com"));
        assert_eq!(lead.ip_address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_email_helpers() {
        assert!(is_valid_email("user@example.com"));
        assert!(!is_valid_email("user@example"));
        assert_eq!(normalize_email("  USER@Example.com\n"), "user@example.com");
    }
}
