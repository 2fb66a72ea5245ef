use std::sync::LazyLock;

use chrono::Utc;
use regex::Regex;

use super::parser::{as_text, as_text_list, RawReport};
use crate::models::{
    ConsultationSession, MedicalReport, Severity, ANONYMOUS_PATIENT, DURATION_NOT_SPECIFIED,
};

const MIN_RECOMMENDATIONS: usize = 3;
const MAX_RECOMMENDATIONS: usize = 7;

/// Map a model-supplied severity onto the fixed scale.
///
/// An exact label (any case) wins. A two-label range written "X to Y",
/// "X-Y" or "X/Y" takes the higher label ("moderate to severe" is Severe).
/// Anything else is rejected, including qualified or negated text such as
/// "mild, not severe".
pub fn normalize_severity(raw: &str) -> Option<Severity> {
    static RANGE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^([a-z]+)\s*(?:-|/|\s+to\s+)\s*([a-z]+)$").unwrap()
    });

    let trimmed = raw.trim();
    if let Some(exact) = exact_severity(trimmed) {
        return Some(exact);
    }

    let caps = RANGE.captures(trimmed)?;
    let low = exact_severity(caps.get(1)?.as_str())?;
    let high = exact_severity(caps.get(2)?.as_str())?;
    Some(if rank(high) >= rank(low) { high } else { low })
}

fn exact_severity(label: &str) -> Option<Severity> {
    Severity::ALL
        .iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(label))
        .copied()
}

fn rank(severity: Severity) -> usize {
    Severity::ALL
        .iter()
        .position(|s| *s == severity)
        .unwrap_or_default()
}

/// Turn an untrusted model object into a `MedicalReport`, field by field.
///
/// `sessionId` and `timestamp` are always set locally; the model's values
/// are ignored.
pub fn validate_report(
    raw: &RawReport,
    session: &ConsultationSession,
) -> Result<MedicalReport, String> {
    let chief_complaint =
        as_text(&raw.chief_complaint).ok_or_else(|| "chiefComplaint is missing or empty".to_string())?;
    let summary = as_text(&raw.summary).ok_or_else(|| "summary is missing or empty".to_string())?;

    let severity_text = as_text(&raw.severity).ok_or_else(|| "severity is missing".to_string())?;
    let severity = normalize_severity(&severity_text)
        .ok_or_else(|| format!("severity '{severity_text}' is not a permitted level"))?;
    if severity.as_str() != severity_text {
        tracing::debug!(from = %severity_text, to = %severity, "Severity normalized");
    }

    let recommendations = as_text_list(&raw.recommendations);
    if !(MIN_RECOMMENDATIONS..=MAX_RECOMMENDATIONS).contains(&recommendations.len()) {
        tracing::warn!(
            session_id = %session.session_id,
            count = recommendations.len(),
            "Recommendation count outside advisory range"
        );
    }

    Ok(MedicalReport {
        session_id_ref: session.session_id.clone(),
        agent_label: as_text(&raw.agent).unwrap_or_else(|| session.selected_specialist.agent_label()),
        patient_label: as_text(&raw.user).unwrap_or_else(|| ANONYMOUS_PATIENT.to_string()),
        generated_at: Utc::now(),
        chief_complaint,
        summary,
        symptoms: distinct(as_text_list(&raw.symptoms)),
        duration_description: as_text(&raw.duration)
            .unwrap_or_else(|| DURATION_NOT_SPECIFIED.to_string()),
        severity,
        medications_mentioned: distinct(as_text_list(&raw.medications_mentioned)),
        recommendations,
    })
}

/// Drop case-insensitive duplicates, keeping first occurrence order.
fn distinct(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::parser::parse_report;
    use crate::specialists;

    fn session() -> ConsultationSession {
        ConsultationSession {
            session_id: "s-42".into(),
            owner_identity: "ana@example.com".into(),
            intake_notes: "cough".into(),
            selected_specialist: specialists::first().clone(),
            transcript: vec![],
            report: None,
            created_on: Utc::now(),
        }
    }

    fn validate(json: &str) -> Result<MedicalReport, String> {
        validate_report(&parse_report(json).unwrap(), &session())
    }

    #[test]
    fn severity_exact_any_case() {
        assert_eq!(normalize_severity("mild"), Some(Severity::Mild));
        assert_eq!(normalize_severity(" CRITICAL "), Some(Severity::Critical));
        assert_eq!(normalize_severity("Moderate"), Some(Severity::Moderate));
    }

    #[test]
    fn severity_ranges_take_higher_label() {
        assert_eq!(normalize_severity("Moderate to Severe"), Some(Severity::Severe));
        assert_eq!(normalize_severity("mild-moderate"), Some(Severity::Moderate));
        assert_eq!(normalize_severity("Severe / Moderate"), Some(Severity::Severe));
    }

    #[test]
    fn qualified_severity_text_rejected() {
        assert_eq!(normalize_severity("Mild, not severe"), None);
        assert_eq!(normalize_severity("Mild (not critical)"), None);
        assert_eq!(normalize_severity("Moderate; no signs of critical illness"), None);
        assert_eq!(normalize_severity("mild to moderate to severe"), None);
        assert_eq!(normalize_severity("not severe"), None);
        assert_eq!(normalize_severity("mild to high"), None);
    }

    #[test]
    fn severity_outside_scale_rejected() {
        assert_eq!(normalize_severity("High"), None);
        assert_eq!(normalize_severity("Unknown"), None);
        assert_eq!(normalize_severity("mildly"), None);
    }

    #[test]
    fn defaults_applied() {
        let report = validate(
            r#"{"chiefComplaint":"Headache","summary":"Patient reports headache.","severity":"Mild"}"#,
        )
        .unwrap();
        assert_eq!(report.patient_label, ANONYMOUS_PATIENT);
        assert_eq!(report.duration_description, DURATION_NOT_SPECIFIED);
        assert_eq!(report.agent_label, "General Physician AI");
        assert!(report.symptoms.is_empty());
        assert!(report.medications_mentioned.is_empty());
    }

    #[test]
    fn identity_fields_set_locally() {
        let report = validate(
            r#"{"sessionId":"model-made-up","timestamp":"1999-01-01","chiefComplaint":"c","summary":"s","severity":"Mild"}"#,
        )
        .unwrap();
        assert_eq!(report.session_id_ref, "s-42");
        assert!(report.generated_at.timestamp() > 946_684_800);
    }

    #[test]
    fn symptoms_deduplicated_in_order() {
        let report = validate(
            r#"{"chiefComplaint":"c","summary":"s","severity":"Mild","symptoms":["Cough"," fever ","cough"]}"#,
        )
        .unwrap();
        assert_eq!(report.symptoms, vec!["Cough", "fever"]);
    }

    #[test]
    fn missing_required_fields_rejected() {
        assert!(validate(r#"{"summary":"s","severity":"Mild"}"#).is_err());
        assert!(validate(r#"{"chiefComplaint":"c","severity":"Mild"}"#).is_err());
        assert!(validate(r#"{"chiefComplaint":"c","summary":"s"}"#).is_err());
        assert!(validate(r#"{"chiefComplaint":"c","summary":"s","severity":"Low"}"#).is_err());
    }

    #[test]
    fn recommendation_count_is_advisory() {
        let report = validate(
            r#"{"chiefComplaint":"c","summary":"s","severity":"Mild","recommendations":["rest"]}"#,
        )
        .unwrap();
        assert_eq!(report.recommendations.len(), 1);
    }
}
