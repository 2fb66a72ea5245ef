use crate::pipeline::sanitize::{sanitize_for_llm, MAX_NOTES_LENGTH};

const RECOMMEND_SYSTEM_TEMPLATE: &str = r#"
You are an AI medical assistant helping users find suitable doctors from a predefined doctor list.

## Doctor Data:
{catalog}

## Instructions:
- Read the user's provided notes/symptoms carefully.
- Analyze what type of doctor or specialization is relevant to these symptoms.
- Select relevant doctors from the provided list, ensuring alignment with their specialization and potential match to symptoms.
- Return ONLY a valid JSON array of matching doctors from the provided list.

## Output Format:
Return:
[
    {
        "id": <given id of the doctor>,
        "image": "<image path>",
        "name": "<specialization>",
        "shortDescription": "<short reason for matching>",
        "voiceProfileId": "<voice id given>"
    },
    ...
]
If no doctor clearly matches, return the first doctor of the list. Always return at least one doctor when you can.
Do not return any text outside of the JSON. Do not add commentary.
"#;

/// System instruction carrying the serialized catalog.
pub fn build_recommend_system_prompt(catalog_json: &str) -> String {
    RECOMMEND_SYSTEM_TEMPLATE
        .trim()
        .replace("{catalog}", catalog_json)
}

/// User message for the recommendation request.
pub fn build_recommend_user_prompt(notes: &str) -> String {
    format!(
        "User notes/symptoms: {}",
        sanitize_for_llm(notes, MAX_NOTES_LENGTH)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specialists;

    #[test]
    fn system_prompt_embeds_catalog() {
        let prompt = build_recommend_system_prompt(&specialists::catalog_json());
        assert!(prompt.contains("General Physician"));
        assert!(prompt.contains("Dentist"));
        assert!(!prompt.contains("{catalog}"));
    }

    #[test]
    fn system_prompt_asks_for_first_entry_default() {
        let prompt = build_recommend_system_prompt("[]");
        assert!(prompt.contains("return the first doctor"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn user_prompt_prefixes_and_sanitizes_notes() {
        let prompt = build_recommend_user_prompt("fever\u{200B} and chills");
        assert_eq!(prompt, "User notes/symptoms: fever and chills");
    }
}
