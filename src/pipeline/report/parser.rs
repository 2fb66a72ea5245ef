use serde::Deserialize;
use serde_json::Value;

/// Report object as the model returned it. Every field is untrusted and
/// optional; `validation` decides what becomes a `MedicalReport`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    pub agent: Option<Value>,
    pub user: Option<Value>,
    #[serde(alias = "chief_complaint")]
    pub chief_complaint: Option<Value>,
    pub summary: Option<Value>,
    pub symptoms: Option<Value>,
    pub duration: Option<Value>,
    pub severity: Option<Value>,
    #[serde(alias = "medications_mentioned", alias = "medications")]
    pub medications_mentioned: Option<Value>,
    pub recommendations: Option<Value>,
}

/// Parse cleaned completion text into a raw report object.
///
/// The text must be a single JSON object. Prose around it is not
/// tolerated.
pub fn parse_report(cleaned: &str) -> Result<RawReport, String> {
    let value: Value = serde_json::from_str(cleaned).map_err(|e| e.to_string())?;
    if !value.is_object() {
        return Err("expected a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Non-empty trimmed string, if the value is one.
pub fn as_text(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Lenient list extraction: an array of strings (non-strings skipped) or a
/// single string treated as one item.
pub fn as_text_list(value: &Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_full_object() {
        let raw = parse_report(
            r#"{"sessionId":"x","agent":"General Physician AI","user":"Ana","chiefComplaint":"Cough",
               "summary":"s","symptoms":["cough"],"duration":"3 days","severity":"Mild",
               "medicationsMentioned":[],"recommendations":["rest"]}"#,
        )
        .unwrap();
        assert_eq!(as_text(&raw.chief_complaint).as_deref(), Some("Cough"));
        assert_eq!(as_text_list(&raw.symptoms), vec!["cough"]);
    }

    #[test]
    fn snake_case_aliases() {
        let raw = parse_report(r#"{"chief_complaint":"Rash","medications":["ibuprofen"]}"#).unwrap();
        assert_eq!(as_text(&raw.chief_complaint).as_deref(), Some("Rash"));
        assert_eq!(as_text_list(&raw.medications_mentioned), vec!["ibuprofen"]);
    }

    #[test]
    fn prose_rejected() {
        assert!(parse_report("Sure! Here's the JSON: {not valid}").is_err());
    }

    #[test]
    fn array_rejected() {
        assert!(parse_report("[]").is_err());
    }

    #[test]
    fn list_leniency() {
        assert_eq!(as_text_list(&Some(json!("fever"))), vec!["fever"]);
        assert_eq!(as_text_list(&Some(json!(["a", 1, " ", "b"]))), vec!["a", "b"]);
        assert!(as_text_list(&None).is_empty());
        assert!(as_text(&Some(json!("   "))).is_none());
        assert!(as_text(&Some(json!(3))).is_none());
    }
}
