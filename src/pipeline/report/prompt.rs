use serde::Serialize;

use crate::models::{ConsultationSession, TranscriptEntry};
use crate::pipeline::sanitize::{sanitize_for_llm, MAX_NOTES_LENGTH, MAX_TRANSCRIPT_ENTRY_LENGTH};

pub const REPORT_SYSTEM_PROMPT: &str = r#"
You are an AI Medical Voice Agent that just completed a comprehensive voice consultation with a patient. Your task is to generate a detailed, professionally structured medical report based on the conversation.

IMPORTANT INSTRUCTIONS:
- Analyze the entire conversation thoroughly
- Be detailed and specific in your analysis (aim for 3-5 sentences per section when applicable)
- Use professional medical terminology while remaining clear
- Structure your output according to the exact JSON schema provided below

Generate a report with the following fields:

1. sessionId: unique session identifier from the agent info
2. agent: the medical specialist name (e.g., "General Physician AI", "Cardiologist AI")
3. user: name of the patient or "Anonymous Patient" if not provided
4. timestamp: current date and time in ISO 8601 format
5. chiefComplaint: A clear, concise one-sentence summary of the patient's main health concern
6. summary: A comprehensive 4-6 sentence analysis covering the consultation overview, key symptoms, severity assessment, primary recommendations and any relevant history
7. symptoms: List of ALL symptoms mentioned. Be exhaustive; do not omit any symptom the patient described
8. duration: Specific timeframe the patient has experienced these symptoms (e.g., "3 days", "2 weeks"). If the patient never said, use exactly "Not specified"
9. severity: Assessment level. It MUST be exactly one of: "Mild", "Moderate", "Severe", "Critical"
10. medicationsMentioned: List of any current medications, supplements, or treatments the patient mentioned
11. recommendations: List of 3-7 actionable next steps (self-care, when to seek in-person care, lifestyle, follow-up, red flags)

OUTPUT FORMAT - Return ONLY valid JSON in this exact structure:
{
  "sessionId": "string",
  "agent": "string",
  "user": "string",
  "timestamp": "ISO 8601 date string",
  "chiefComplaint": "string",
  "summary": "string",
  "symptoms": ["symptom1", "symptom2"],
  "duration": "string",
  "severity": "Mild | Moderate | Severe | Critical",
  "medicationsMentioned": ["medication1"],
  "recommendations": ["recommendation1", "recommendation2", "recommendation3"]
}

Do not include any markdown formatting, code blocks, or additional text. Return only the JSON object.
"#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentInfo<'a> {
    session_id: &'a str,
    notes: String,
    specialist: &'a str,
    specialist_description: &'a str,
    agent: String,
}

/// User message: agent info followed by the conversation, both as JSON.
pub fn build_report_user_prompt(session: &ConsultationSession, transcript: &[TranscriptEntry]) -> String {
    let info = AgentInfo {
        session_id: &session.session_id,
        notes: sanitize_for_llm(&session.intake_notes, MAX_NOTES_LENGTH),
        specialist: &session.selected_specialist.name,
        specialist_description: &session.selected_specialist.short_description,
        agent: session.selected_specialist.agent_label(),
    };

    let cleaned: Vec<TranscriptEntry> = transcript
        .iter()
        .map(|e| TranscriptEntry::new(e.role, sanitize_for_llm(&e.text, MAX_TRANSCRIPT_ENTRY_LENGTH)))
        .collect();

    let info_json = serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string());
    let conversation_json = serde_json::to_string(&cleaned).unwrap_or_else(|_| "[]".to_string());

    format!("AI Doctor Agent info:{info_json},Conversation:{conversation_json}")
}
