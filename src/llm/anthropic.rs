use super::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl MessagesResponse {
    /// Concatenated text blocks; tool-use and other block types are skipped
    fn text(&self) -> LlmResult<String> {
        let text: String = self
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(LlmError::ParseError("No text content in response".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(&self, request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let start = Instant::now();

        let model = request
            .model_override
            .clone()
            .unwrap_or_else(|| self.model.clone());

        let body = MessagesRequest {
            model: &model,
            // Required by the Messages API
            max_tokens: request.max_tokens.unwrap_or(300),
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.user_message,
            }],
        };

        let response = tokio::time::timeout(
            request.timeout,
            self.client
                .post(MESSAGES_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", API_VERSION)
                .json(&body)
                .send(),
        )
        .await
        .map_err(|_| LlmError::Timeout(request.timeout))?
        .map_err(|e| LlmError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error("anthropic", status, &body));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(e.to_string()))?;
        let text = parsed.text()?;

        Ok(GenerateResponse {
            text: text.trim().to_string(),
            metadata: ResponseMetadata {
                provider: "anthropic".to_string(),
                model,
                tokens_used: parsed.usage.map(|u| u.input_tokens + u.output_tokens),
                latency_ms: start.elapsed().as_millis() as u64,
            },
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let body = MessagesRequest {
            model: "claude-3-5-haiku-20241022",
            max_tokens: 300,
            system: "You are playing a word guessing game.",
            messages: vec![Message {
                role: "user",
                content: "My description: \"a huge grey creature\"",
            }],
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "claude-3-5-haiku-20241022");
        assert_eq!(value["max_tokens"], 300);
        assert_eq!(value["system"], "You are playing a word guessing game.");
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_text_joins_text_blocks() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{
                "content": [
                    {"type": "text", "text": "GUESS 1: Elephant - big\n"},
                    {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                    {"type": "text", "text": "GUESS 2: Mammoth - ancient"}
                ],
                "usage": {"input_tokens": 40, "output_tokens": 12}
            }"#,
        )
        .unwrap();

        assert_eq!(
            parsed.text().unwrap(),
            "GUESS 1: Elephant - big\nGUESS 2: Mammoth - ancient"
        );
        let usage = parsed.usage.unwrap();
        assert_eq!(usage.input_tokens + usage.output_tokens, 52);
    }

    #[test]
    fn test_response_without_text_is_parse_error() {
        let parsed: MessagesResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(matches!(parsed.text(), Err(LlmError::ParseError(_))));
    }

    #[tokio::test]
    #[ignore] // Only run with actual API key
    async fn test_anthropic_generate() {
        let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");
        let provider = AnthropicProvider::new(api_key, "claude-3-5-haiku-20241022".to_string());

        let request = GenerateRequest {
            system_prompt: "Answer with one word.".to_string(),
            user_message: "What animal has a trunk?".to_string(),
            max_tokens: Some(50),
            timeout: Duration::from_secs(30),
            model_override: None,
        };

        let response = provider.generate(request).await.unwrap();
        assert!(!response.text.is_empty());
        assert_eq!(response.metadata.provider, "anthropic");
    }
}
