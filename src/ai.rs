use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_AI_API_URL: &str = "http://localhost:8787";

/// Fixed delay between warm-up attempts. The backend cold-starts, so the
/// probe retries indefinitely at this interval with no backoff.
pub const WARM_UP_RETRY_DELAY: Duration = Duration::from_secs(5);

const GENERIC_CLIENT_MESSAGE: &str = "The AI request was rejected. Please try again.";

#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("The AI service is handling too many requests right now.")]
    RateLimited,

    /// A 4xx other than 429; carries the backend-supplied message when the
    /// body has one, otherwise a generic fallback.
    #[error("{0}")]
    Client(String),

    #[error("The AI service hit an unexpected error. Please try again later.")]
    Unexpected,

    #[error("Could not reach the AI service: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for AiError {
    fn from(error: reqwest::Error) -> Self {
        AiError::Transport(error.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersePayload {
    pub verse: u32,
    pub text: String,
}

/// Request body for `POST /api/response`, discriminated by `type`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum AiRequestBody {
    #[serde(rename = "devotion")]
    Devotion {
        book: String,
        chapter: String,
        version: String,
        language: String,
        use_cache: bool,
        verses: Vec<VersePayload>,
    },
    #[serde(rename = "free-form")]
    FreeForm {
        book: String,
        chapter: String,
        version: String,
        language: String,
        question: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_response_id: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct DevotionResponse {
    pub response: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub response_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client for the AI generation API. Every request carries the API key header.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Probe `GET /` until the backend answers 2xx. Retries forever with a
    /// fixed delay; this wait-for-cold-start pattern applies to the probe
    /// only, never to content requests.
    pub async fn warm_up(&self) {
        loop {
            match self
                .client
                .get(&self.base_url)
                .header("x-api-key", &self.api_key)
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    tracing::info!("AI backend ready");
                    return;
                }
                Ok(response) => {
                    tracing::debug!(status = %response.status(), "AI backend not ready yet");
                }
                Err(error) => {
                    tracing::debug!(%error, "AI backend unreachable, retrying");
                }
            }
            tokio::time::sleep(WARM_UP_RETRY_DELAY).await;
        }
    }

    async fn send(&self, body: &AiRequestBody) -> Result<reqwest::Response, AiError> {
        let url = format!("{}/api/response", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            tracing::warn!("AI request rate limited");
            return Err(AiError::RateLimited);
        }

        if status.is_client_error() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| GENERIC_CLIENT_MESSAGE.to_string());
            tracing::warn!(%status, %message, "AI request rejected");
            return Err(AiError::Client(message));
        }

        tracing::warn!(%status, "AI request failed");
        Err(AiError::Unexpected)
    }

    pub async fn devotion(&self, body: AiRequestBody) -> Result<DevotionResponse, AiError> {
        let response = self.send(&body).await?;
        Ok(response.json().await?)
    }

    pub async fn free_form(&self, body: AiRequestBody) -> Result<ChatResponse, AiError> {
        let response = self.send(&body).await?;
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn devotion_body_is_tagged() {
        let body = AiRequestBody::Devotion {
            book: "genesis".to_string(),
            chapter: "3".to_string(),
            version: "kjv".to_string(),
            language: "English".to_string(),
            use_cache: true,
            verses: vec![VersePayload {
                verse: 1,
                text: "In the beginning".to_string(),
            }],
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "devotion");
        assert_eq!(json["use_cache"], true);
        assert_eq!(json["verses"][0]["verse"], 1);
    }

    #[test]
    fn free_form_body_omits_missing_continuation_token() {
        let body = AiRequestBody::FreeForm {
            book: "genesis".to_string(),
            chapter: "3".to_string(),
            version: "kjv".to_string(),
            language: "English".to_string(),
            question: "Who is speaking here?".to_string(),
            previous_response_id: None,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], "free-form");
        assert!(json.get("previous_response_id").is_none());
    }

    #[test]
    fn free_form_body_carries_continuation_token_when_present() {
        let body = AiRequestBody::FreeForm {
            book: "genesis".to_string(),
            chapter: "3".to_string(),
            version: "kjv".to_string(),
            language: "English".to_string(),
            question: "And then?".to_string(),
            previous_response_id: Some("resp_123".to_string()),
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["previous_response_id"], "resp_123");
    }
}
