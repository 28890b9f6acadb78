use super::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Google Gemini provider (generateContent REST endpoint)
///
/// The token limit is not forwarded: Gemini's thinking models spend part of
/// `maxOutputTokens` on hidden reasoning and would cut the guesses short.
pub struct GoogleProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(model: &str) -> String {
        format!("{}/{}:generateContent", API_BASE, model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Text of the first candidate
    fn text(&self) -> LlmResult<String> {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::ParseError("No content in response".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for GoogleProvider {
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let start = Instant::now();

        let model = request
            .model_override
            .clone()
            .unwrap_or_else(|| self.model.clone());

        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_prompt,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.user_message,
                }],
            }],
        };

        let response = tokio::time::timeout(
            request.timeout,
            self.client
                .post(Self::endpoint(&model))
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| LlmError::Timeout(request.timeout))?
        .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("google", status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let text = parsed.text()?;

        Ok(GenerateResponse {
            text: text.trim().to_string(),
            metadata: ResponseMetadata {
                provider: "google".to_string(),
                model,
                tokens_used: parsed.usage_metadata.and_then(|u| u.total_token_count),
                latency_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    fn name(&self) -> &str {
        "google"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            GoogleProvider::endpoint("gemini-2.0-flash-lite"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-lite:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: "system" }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: "clue" }],
            }],
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "system");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "clue");
    }

    #[test]
    fn test_response_text() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "GUESS 1: Pizza - "}, {"text": "round food"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 80, "totalTokenCount": 95}
            }"#,
        )
        .unwrap();

        assert_eq!(parsed.text().unwrap(), "GUESS 1: Pizza - round food");
        assert_eq!(parsed.usage_metadata.unwrap().total_token_count, Some(95));
    }

    #[test]
    fn test_blocked_response_is_parse_error() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(parsed.text(), Err(LlmError::ParseError(_))));
    }

    #[tokio::test]
    #[ignore] // Only run with actual API key
    async fn test_google_generate() {
        let api_key = std::env::var("GOOGLE_API_KEY").expect("GOOGLE_API_KEY not set");
        let provider = GoogleProvider::new(api_key, "gemini-2.0-flash-lite".to_string());

        let request = GenerateRequest {
            system_prompt: "Answer with one word.".to_string(),
            user_message: "What animal has a trunk?".to_string(),
            max_tokens: None,
            timeout: Duration::from_secs(30),
            model_override: None,
        };

        let response = provider.generate(request).await.unwrap();
        assert!(!response.text.is_empty());
        assert_eq!(response.metadata.provider, "google");
    }
}
