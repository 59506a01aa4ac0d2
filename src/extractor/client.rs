// file: src/extractor/client.rs
// description: single-request extraction backend over OpenAI-compatible chat completions
// reference: https://docs.rs/reqwest

use crate::error::{PipelineError, Result};
use crate::extractor::profiles::ModelProfile;
use crate::extractor::prompt;
use crate::models::{ExtractionRecord, RawExtraction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One extraction attempt over one chunk of text. Implementations perform
/// exactly one request and no retry; the retry policy lives entirely in the
/// controller.
pub trait ExtractionBackend: Send + Sync + 'static {
    fn extract(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ExtractionRecord>>> + Send;
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ExtractionsBody {
    #[serde(default)]
    extractions: Vec<RawExtraction>,
}

/// Production backend: posts the prompt, the few-shot turns and the chunk
/// text to an OpenAI-compatible `chat/completions` endpoint and validates
/// the JSON reply into typed records.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    profile: ModelProfile,
}

impl ChatCompletionsClient {
    pub fn new(profile: ModelProfile) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(profile.request_timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, profile })
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        let mut messages = vec![ChatMessage {
            role: "system",
            content: prompt::system_prompt(),
        }];
        for (user, assistant) in prompt::example_turns() {
            messages.push(ChatMessage {
                role: "user",
                content: user,
            });
            messages.push(ChatMessage {
                role: "assistant",
                content: assistant,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: text.to_string(),
        });

        ChatRequest {
            model: self.profile.model_id.clone(),
            messages,
            temperature: 0.1,
            max_tokens: self.profile.max_output_tokens,
        }
    }
}

impl ExtractionBackend for ChatCompletionsClient {
    async fn extract(&self, text: &str) -> Result<Vec<ExtractionRecord>> {
        let url = format!("{}/chat/completions", self.profile.base_url);
        let request = self.build_request(text);

        debug!(
            "Requesting extraction from {} for {} chars",
            self.profile.model_id,
            text.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.profile.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::RateLimited(truncate(&body, 200)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::Transport(format!(
                "HTTP {}: {}",
                status,
                truncate(&body, 200)
            )));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Parse(format!("malformed completion envelope: {}", e)))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::Parse("response contained no choices".to_string()))?;

        parse_extraction_content(&content)
    }
}

/// Parse the model's message content into validated records. Tolerates
/// markdown code fences and leading/trailing prose around the JSON object,
/// which thinking models emit despite the instructions.
pub fn parse_extraction_content(content: &str) -> Result<Vec<ExtractionRecord>> {
    let json_str = isolate_json_object(content)
        .ok_or_else(|| PipelineError::Parse("no JSON object in response".to_string()))?;

    let body: ExtractionsBody = serde_json::from_str(json_str)
        .map_err(|e| PipelineError::Parse(format!("invalid extraction JSON: {}", e)))?;

    body.extractions
        .into_iter()
        .map(ExtractionRecord::from_raw)
        .collect()
}

fn isolate_json_object(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    let without_fences = if trimmed.starts_with("```") {
        let inner = trimmed.trim_start_matches("```json").trim_start_matches("```");
        inner.trim_end_matches("```").trim()
    } else {
        trimmed
    };

    let start = without_fences.find('{')?;
    let end = without_fences.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&without_fences[start..=end])
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VALID_BODY: &str = r#"{"extractions": [
        {"extraction_class": "property", "extraction_text": "UTS of 853 MPa",
         "attributes": {"material_id": "A1", "property_type": "UTS",
                        "value": "853", "unit": "MPa"}}
    ]}"#;

    #[test]
    fn test_parse_plain_json() {
        let records = parse_extraction_content(VALID_BODY).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].material_id(), "A1");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID_BODY);
        let records = parse_extraction_content(&fenced).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_json_with_surrounding_prose() {
        let chatty = format!("Here are the extractions:\n{}\nHope that helps!", VALID_BODY);
        let records = parse_extraction_content(&chatty).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_empty_extractions_is_ok() {
        let records = parse_extraction_content(r#"{"extractions": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_garbage_is_parse_error() {
        assert!(matches!(
            parse_extraction_content("the model refused"),
            Err(PipelineError::Parse(_))
        ));
        assert!(matches!(
            parse_extraction_content(r#"{"extractions": [{"extraction_class": 3}]}"#),
            Err(PipelineError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_unknown_class_is_parse_error() {
        let body = r#"{"extractions": [
            {"extraction_class": "phase", "extraction_text": "FCC", "attributes": {}}
        ]}"#;
        assert!(matches!(
            parse_extraction_content(body),
            Err(PipelineError::Parse(_))
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let s = "高熵合金高熵合金";
        let out = truncate(s, 7);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 10);
    }
}
