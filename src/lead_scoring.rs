//! Additive lead scoring and priority bands.

use crate::models::LeadPriority;
use crate::normalize::fold_text;

pub const BASE_SCORE: u8 = 50;
pub const MAX_SCORE: u8 = 100;

/// Pain-point keyword groups and the points each group adds (once per group).
const PAIN_POINT_RULES: &[(&[&str], u8)] = &[
    (&["automatizar", "proceso"], 15),
    (&["crm", "integracion"], 10),
    (&["dashboard", "visibilidad"], 10),
];

/// The inputs the score depends on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreSignals<'a> {
    pub has_website: bool,
    pub has_phone: bool,
    pub has_utm_source: bool,
    pub has_utm_campaign: bool,
    pub pain_point: &'a str,
}

/// Computes the lead score, capped at [`MAX_SCORE`].
pub fn score_lead(signals: &ScoreSignals<'_>) -> u8 {
    let mut score = u32::from(BASE_SCORE);

    if signals.has_website {
        score += 10;
    }
    if signals.has_phone {
        score += 5;
    }
    if signals.has_utm_source {
        score += 5;
    }
    if signals.has_utm_campaign {
        score += 5;
    }

    let pain_point = fold_text(signals.pain_point);
    for (keywords, points) in PAIN_POINT_RULES {
        if keywords.iter().any(|k| pain_point.contains(k)) {
            score += u32::from(*points);
        }
    }

    score.min(u32::from(MAX_SCORE)) as u8
}

/// Maps a score to its priority band: >=80 high, >=60 medium, otherwise low.
pub fn priority_for(score: u8) -> LeadPriority {
    match score {
        s if s >= 80 => LeadPriority::High,
        s if s >= 60 => LeadPriority::Medium,
        _ => LeadPriority::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_submission_scores_base() {
        let signals = ScoreSignals {
            pain_point: "Necesitamos ayuda",
            ..Default::default()
        };
        assert_eq!(score_lead(&signals), 50);
        assert_eq!(priority_for(50), LeadPriority::Low);
    }

    #[test]
    fn test_each_signal_adds_its_points() {
        let signals = ScoreSignals {
            has_website: true,
            has_phone: true,
            has_utm_source: true,
            has_utm_campaign: true,
            pain_point: "",
        };
        assert_eq!(score_lead(&signals), 75);
    }

    #[test]
    fn test_keyword_groups_count_once() {
        let signals = ScoreSignals {
            pain_point: "Queremos automatizar el proceso de ventas",
            ..Default::default()
        };
        // "automatizar" and "proceso" are the same group
        assert_eq!(score_lead(&signals), 65);

        let signals = ScoreSignals {
            pain_point: "Integración con el CRM y un dashboard con visibilidad",
            ..Default::default()
        };
        assert_eq!(score_lead(&signals), 70);
    }

    #[test]
    fn test_score_is_capped() {
        let signals = ScoreSignals {
            has_website: true,
            has_phone: true,
            has_utm_source: true,
            has_utm_campaign: true,
            pain_point: "automatizar crm dashboard",
        };
        assert_eq!(score_lead(&signals), 100);
        assert_eq!(priority_for(100), LeadPriority::High);
    }

    #[test]
    fn test_priority_thresholds() {
        assert_eq!(priority_for(0), LeadPriority::Low);
        assert_eq!(priority_for(59), LeadPriority::Low);
        assert_eq!(priority_for(60), LeadPriority::Medium);
        assert_eq!(priority_for(79), LeadPriority::Medium);
        assert_eq!(priority_for(80), LeadPriority::High);
    }
}
