/// Property-based tests using proptest
/// Tests invariants and properties that should hold for all inputs
use proptest::prelude::*;
use rust_leads_api::core::dispatcher::{ReplyCatalog, ReplyCategory};
use rust_leads_api::core::intake::{build_lead, is_valid_email, normalize_email};
use rust_leads_api::core::lead_scoring::{priority_for, score_lead, ScoreSignals};
use rust_leads_api::core::models::{ContactSubmission, LeadPriority, RequestContext};
use rust_leads_api::webhook_verifier::{sign, verify_signature};

fn rank(priority: LeadPriority) -> u8 {
    match priority {
        LeadPriority::Low => 0,
        LeadPriority::Medium => 1,
        LeadPriority::High => 2,
    }
}

// Property: scores stay within bounds for every combination of signals
proptest! {
    #[test]
    fn score_is_bounded(
        has_website in any::<bool>(),
        has_phone in any::<bool>(),
        has_utm_source in any::<bool>(),
        has_utm_campaign in any::<bool>(),
        pain_point in "\\PC*"
    ) {
        let score = score_lead(&ScoreSignals {
            has_website,
            has_phone,
            has_utm_source,
            has_utm_campaign,
            pain_point: &pain_point,
        });
        prop_assert!((50..=100).contains(&score));
    }

    #[test]
    fn extra_signals_never_lower_the_score(pain_point in "\\PC{0,200}", suffix in "[a-z ]{0,40}") {
        let bare = ScoreSignals { pain_point: &pain_point, ..Default::default() };
        let with_website = ScoreSignals { has_website: true, ..bare };
        prop_assert!(score_lead(&with_website) >= score_lead(&bare));

        let longer = format!("{} {}", pain_point, suffix);
        let extended = ScoreSignals { pain_point: &longer, ..bare };
        prop_assert!(score_lead(&extended) >= score_lead(&bare));
    }

    #[test]
    fn priority_is_monotonic(a in 0u8..=100, b in 0u8..=100) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(rank(priority_for(low)) <= rank(priority_for(high)));
    }
}

// Property: intake never panics and only accepts normalised emails
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn accepted_leads_have_normalized_email(
        local in "[A-Za-z0-9]{1,12}",
        domain in "[A-Za-z]{1,12}",
        tld in "[a-z]{2,4}",
        padding in " {0,3}"
    ) {
        let raw = format!("{}{}@{}.{}{}", padding, local, domain, tld, padding);
        let submission = ContactSubmission {
            name: Some("Ana".into()),
            email: Some(raw.clone()),
            company: Some("Acme".into()),
            pain_point: Some("crecer".into()),
            ..Default::default()
        };

        let lead = build_lead(submission, RequestContext::default()).unwrap();
        prop_assert_eq!(&lead.email, &normalize_email(&raw));
        prop_assert_eq!(lead.email.clone(), lead.email.to_lowercase());
        prop_assert_eq!(lead.email.trim(), lead.email.as_str());
    }

    #[test]
    fn build_lead_never_panics(
        name in proptest::option::of("\\PC{0,300}"),
        email in proptest::option::of("\\PC{0,300}"),
        company in proptest::option::of("\\PC{0,300}"),
        pain_point in proptest::option::of("\\PC{0,300}")
    ) {
        let submission = ContactSubmission { name, email, company, pain_point, ..Default::default() };
        let _ = build_lead(submission, RequestContext::default());
    }
}

// Property: the router always produces a reply, and unmatched text is echoed
proptest! {
    #[test]
    fn dispatch_always_replies(text in "\\PC{0,200}") {
        let reply = ReplyCatalog::STANDARD.dispatch(&text);
        prop_assert!(!reply.body.is_empty());
        if reply.category == ReplyCategory::Default {
            prop_assert!(reply.body.contains(text.trim()));
        }
    }
}

// Property: any change to body or signature breaks verification
proptest! {
    #[test]
    fn signature_round_trips(secret in "[a-zA-Z0-9]{1,32}", body in proptest::collection::vec(any::<u8>(), 0..256)) {
        let signature = sign(&secret, &body).unwrap();
        prop_assert!(verify_signature(&secret, &body, &signature));
    }

    #[test]
    fn tampered_body_fails(
        secret in "[a-zA-Z0-9]{1,32}",
        body in proptest::collection::vec(any::<u8>(), 1..256),
        index in any::<prop::sample::Index>(),
        flip in 1u8..=255
    ) {
        let signature = sign(&secret, &body).unwrap();
        let mut tampered = body.clone();
        let i = index.index(tampered.len());
        tampered[i] ^= flip;
        prop_assert!(!verify_signature(&secret, &tampered, &signature));
    }

    #[test]
    fn tampered_signature_fails(
        secret in "[a-zA-Z0-9]{1,32}",
        body in proptest::collection::vec(any::<u8>(), 0..256),
        index in any::<prop::sample::Index>()
    ) {
        let signature = sign(&secret, &body).unwrap();
        // flip one hex digit after the "sha256=" prefix
        let mut chars: Vec<char> = signature.chars().collect();
        let i = 7 + index.index(chars.len() - 7);
        chars[i] = if chars[i] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();
        prop_assert!(!verify_signature(&secret, &body, &tampered));
    }
}
