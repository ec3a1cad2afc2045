use serde::{Deserialize, Serialize};

/// `generateContent` request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `generateContent` response body
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let json = serde_json::to_value(GenerateContentRequest::from_prompt("hi")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hi" }] }] })
        );
    }

    #[test]
    fn test_first_text() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"one"},{"text":"two"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.first_text(), Some("one"));
    }

    #[test]
    fn test_first_text_missing() {
        let response: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(response.first_text(), None);

        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[]}}]}"#).unwrap();
        assert_eq!(response.first_text(), None);
    }
}
