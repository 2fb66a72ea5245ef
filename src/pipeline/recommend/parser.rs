use serde_json::Value;

use crate::models::SpecialistProfile;
use crate::specialists;

/// Why the cleaned completion text could not be read as a specialist list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnArray(pub String);

/// Map the model's JSON onto catalog profiles.
///
/// Entries are resolved by `id` against the registry so that the returned
/// profiles always carry the catalog's persona prompts, never model-invented
/// text. Unknown ids and entries without an id are skipped. A bare object is
/// accepted as a one-element array. An empty array passes through.
pub fn parse_recommendations(cleaned: &str) -> Result<Vec<SpecialistProfile>, NotAnArray> {
    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| NotAnArray(e.to_string()))?;

    let entries = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        other => {
            return Err(NotAnArray(format!(
                "expected a JSON array, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut out: Vec<SpecialistProfile> = Vec::with_capacity(entries.len());
    for entry in &entries {
        let Some(id) = entry_id(entry) else {
            tracing::warn!("Recommendation entry without a usable id skipped");
            continue;
        };
        match specialists::find(id) {
            Some(profile) if !out.iter().any(|p| p.id == id) => out.push(profile.clone()),
            Some(_) => {}
            None => tracing::warn!(id, "Recommendation referenced unknown specialist id"),
        }
    }
    Ok(out)
}

fn entry_id(entry: &Value) -> Option<u32> {
    let id = entry.get("id")?;
    match id {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
