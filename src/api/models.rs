use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl UserInfo {
    pub fn name(&self) -> Option<&str> {
        present(&self.name)
    }

    pub fn age(&self) -> Option<&str> {
        present(&self.age)
    }

    pub fn country(&self) -> Option<&str> {
        present(&self.country)
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

// Browsers send the age input as a string, other callers as a number.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Number(number) => number.to_string(),
        }),
    )
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "userInfo", default, skip_serializing_if = "Option::is_none")]
    pub user_info: Option<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimalMatch {
    pub animal: String,
    pub confidence: u32,
    pub description: String,
    pub emoji: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_numeric_and_textual_age() {
        let numeric: UserInfo = serde_json::from_str(r#"{"name":"Ada","age":36}"#).unwrap();
        let textual: UserInfo = serde_json::from_str(r#"{"age":"36","country":null}"#).unwrap();

        assert_eq!(numeric.age(), Some("36"));
        assert_eq!(textual.age(), Some("36"));
        assert_eq!(textual.country(), None);
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let info: UserInfo =
            serde_json::from_str(r#"{"name":"","age":"","country":"  "}"#).unwrap();
        assert_eq!(info.name(), None);
        assert_eq!(info.age(), None);
        assert_eq!(info.country(), None);
    }

    #[test]
    fn request_uses_camel_case_user_info() {
        let request: AnalyzeRequest =
            serde_json::from_str(r#"{"image":"data:image/png;base64,AA==","userInfo":{"name":"Ada"}}"#)
                .unwrap();
        assert_eq!(request.user_info.unwrap().name(), Some("Ada"));
    }
}
