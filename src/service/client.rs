use std::time::Duration;
use tracing::{debug, error, info};

use super::error::ServiceError;
use super::messages::{GenerateContentRequest, GenerateContentResponse};
use crate::config::GenerationConfig;

/// Text generation service used for both questions and scoring
#[async_trait::async_trait]
pub trait GenerativeService: Send + Sync {
    /// Send a prompt and return the generated text
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError>;
}

const CREDENTIAL_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` endpoint
///
/// The credential travels in a header so it never appears in a URL.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    credential: Option<String>,
}

impl GeminiClient {
    /// Build a client, reading the credential from the configured environment variable
    pub fn new(config: &GenerationConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        let credential = config.credential();
        if credential.is_none() {
            info!(
                "{} is not set; generation requests will fail",
                config.credential_env
            );
        }

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            credential,
        })
    }

    /// Override the credential
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential;
        self
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl GenerativeService for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ServiceError> {
        let key = self
            .credential
            .as_deref()
            .ok_or(ServiceError::MissingCredential)?;

        let endpoint = self.endpoint();
        debug!(
            "Calling {} (prompt length: {} chars)",
            endpoint,
            prompt.len()
        );

        let response = self
            .http
            .post(&endpoint)
            .header(CREDENTIAL_HEADER, key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Generation API error ({}): {}", status, body);
            return Err(ServiceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::MalformedResponse(e.without_url().to_string()))?;

        let text = body
            .first_text()
            .ok_or_else(|| ServiceError::MalformedResponse("no candidate text".to_string()))?;

        debug!("Generation returned {} chars", text.len());
        Ok(text.to_string())
    }
}
