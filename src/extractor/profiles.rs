// file: src/extractor/profiles.rs
// description: model registry mapping backend names to endpoint profiles
// reference: AI Studio OpenAI-compatible API plus Gemini's OpenAI endpoint

use crate::error::{PipelineError, Result};
use std::env;

const AI_STUDIO_BASE_URL: &str = "https://aistudio.baidu.com/llm/lmapi/v3";
const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Per-request HTTP timeout. Kept above the default chunk timeout so a
/// slow model hits the chunk watchdog (and its skip accounting) rather
/// than surfacing as a transport error.
const REQUEST_TIMEOUT_SECS: u64 = 300;

/// Endpoint, credential and token-limit configuration for one backend.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    /// Short name used in the output file (he_data_{label}.jsonl).
    pub label: String,
    pub model_id: String,
    pub base_url: String,
    pub api_key: String,
    /// Output-token cap. Kept below the provider maximum so long property
    /// tables don't get truncated mid-JSON.
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
}

/// Resolve a model name to its profile. Unknown names and missing
/// credentials are fatal startup errors, never per-chunk errors.
pub fn get_model_config(model_name: &str) -> Result<ModelProfile> {
    match model_name {
        // Max Output 12k for deepseek/ernie4; 8192 leaves headroom
        "deepseek" => ai_studio_profile("deepseek-v3", 8192, "deepseek"),
        "ernie4" => ai_studio_profile("ernie-4.5-turbo-128k-preview", 8192, "ernie4"),
        // Max Output 32k; 16384 for long tables
        "qwen" => ai_studio_profile("qwen3-coder-30b-a3b-instruct", 16384, "qwen"),
        "kimi" => ai_studio_profile("kimi-k2-instruct", 16384, "kimi"),
        "ernie5" => ai_studio_profile("ernie-5.0-thinking-preview", 8192, "ernie5"),
        "gemini" => gemini_profile(),
        other => Err(PipelineError::UnknownModel(other.to_string())),
    }
}

fn ai_studio_profile(model_id: &str, max_output_tokens: u32, label: &str) -> Result<ModelProfile> {
    let api_key = env::var("AI_STUDIO_API_KEY")
        .map_err(|_| PipelineError::Config("AI_STUDIO_API_KEY is not set".to_string()))?;

    Ok(ModelProfile {
        label: label.to_string(),
        model_id: model_id.to_string(),
        base_url: AI_STUDIO_BASE_URL.to_string(),
        api_key,
        max_output_tokens,
        request_timeout_secs: REQUEST_TIMEOUT_SECS,
    })
}

fn gemini_profile() -> Result<ModelProfile> {
    let api_key = env::var("GOOGLE_API_KEY")
        .or_else(|_| env::var("GEMINI_API_KEY"))
        .map_err(|_| {
            PipelineError::Config("GOOGLE_API_KEY or GEMINI_API_KEY is not set".to_string())
        })?;

    Ok(ModelProfile {
        label: "gemini".to_string(),
        model_id: "gemini-2.0-flash".to_string(),
        base_url: GEMINI_OPENAI_BASE_URL.to_string(),
        api_key,
        max_output_tokens: 8192,
        request_timeout_secs: REQUEST_TIMEOUT_SECS,
    })
}
