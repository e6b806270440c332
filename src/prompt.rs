use crate::api::UserInfo;

const ANALYSIS_INSTRUCTION: &str = "Analyze this selfie and determine which animal the person \
most resembles based on their facial features, expression, and overall appearance.";

const RESPONSE_FORMAT: &str = r#"Respond ONLY with a JSON object in this exact format (no markdown, no code blocks):
{
  "animal": "name of the animal",
  "confidence": number between 70-95,
  "description": "a fun, lighthearted 1-2 sentence description of why they match this animal",
  "emoji": "single emoji representing the animal"
}"#;

const TONE_GUIDANCE: &str =
    "Be creative, fun, and positive. Choose from common animals that people would recognize.";

// Age and country are only mentioned alongside a name.
pub fn user_context_sentence(user: &UserInfo) -> String {
    let Some(name) = user.name() else {
        return String::new();
    };

    let mut sentence = format!("The person's name is {name}");
    if let Some(age) = user.age() {
        sentence.push_str(&format!(", they are {age} years old"));
    }
    if let Some(country) = user.country() {
        sentence.push_str(&format!(", and they live in {country}"));
    }
    sentence.push('.');
    sentence
}

pub fn build_instruction(user: Option<&UserInfo>) -> String {
    let context = user.map(user_context_sentence).unwrap_or_default();

    let mut instruction = String::from(ANALYSIS_INSTRUCTION);
    if !context.is_empty() {
        instruction.push(' ');
        instruction.push_str(&context);
    }
    instruction.push_str("\n\n");
    instruction.push_str(RESPONSE_FORMAT);
    instruction.push_str("\n\n");
    instruction.push_str(TONE_GUIDANCE);
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str, age: &str, country: &str) -> UserInfo {
        let field = |value: &str| (!value.is_empty()).then(|| value.to_string());
        UserInfo {
            name: field(name),
            age: field(age),
            country: field(country),
        }
    }

    #[test]
    fn name_only_omits_age_and_country() {
        assert_eq!(
            user_context_sentence(&user("Ada", "", "")),
            "The person's name is Ada."
        );
    }

    #[test]
    fn full_identity_sentence() {
        assert_eq!(
            user_context_sentence(&user("Ada", "36", "England")),
            "The person's name is Ada, they are 36 years old, and they live in England."
        );
    }

    #[test]
    fn no_name_means_no_context() {
        assert_eq!(user_context_sentence(&user("", "36", "England")), "");
    }

    #[test]
    fn instruction_without_user_has_no_identity() {
        let instruction = build_instruction(None);
        assert!(instruction.starts_with(ANALYSIS_INSTRUCTION));
        assert!(!instruction.contains("The person's name is"));
        assert!(instruction.contains(r#""confidence": number between 70-95"#));
    }

    #[test]
    fn instruction_embeds_identity_after_task() {
        let instruction = build_instruction(Some(&user("Ada", "", "Peru")));
        assert!(instruction.contains("overall appearance. The person's name is Ada, and they live in Peru."));
        assert!(!instruction.contains("years old"));
    }
}
