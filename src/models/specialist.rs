use serde::{Deserialize, Serialize};

/// A specialist persona the patient can consult.
///
/// Sessions embed a snapshot of the profile taken at selection time, so this
/// type is serialized into the session row as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistProfile {
    pub id: u32,
    /// Display name of the specialty ("General Physician", "Cardiologist").
    pub name: String,
    pub short_description: String,
    pub image: String,
    /// Full system instruction for the voice persona, including the AI
    /// disclaimer and the emergency escalation clause.
    pub persona_prompt: String,
    pub voice_profile_id: String,
    pub entitlement_required: bool,
}

impl SpecialistProfile {
    /// Label used for the agent in generated reports.
    pub fn agent_label(&self) -> String {
        format!("{} AI", self.name)
    }

    /// Whether a caller with the given entitlement may consult this specialist.
    pub fn is_available_to(&self, premium: bool) -> bool {
        !self.entitlement_required || premium
    }
}

/// Catalog entry without the persona prompt, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistSummary {
    pub id: u32,
    pub name: String,
    pub short_description: String,
    pub image: String,
    pub voice_profile_id: String,
    pub entitlement_required: bool,
}

impl From<&SpecialistProfile> for SpecialistSummary {
    fn from(p: &SpecialistProfile) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            short_description: p.short_description.clone(),
            image: p.image.clone(),
            voice_profile_id: p.voice_profile_id.clone(),
            entitlement_required: p.entitlement_required,
        }
    }
}
