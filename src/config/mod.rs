pub mod prompt;

use crate::cli::Args;
use crate::llm::{ LlmConfig, LlmType, ParseLlmTypeError };
use std::time::Duration;
use thiserror::Error;

/// Startup-time configuration failures. Any of these stops the process
/// before the listener is bound.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidLlmType(#[from] ParseLlmTypeError),
    #[error("API key for '{0}' is missing; set OPENAI_API_KEY or pass --chat-api-key")]
    MissingApiKey(LlmType),
    #[error("invalid API key format: {0}")]
    InvalidApiKey(String),
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        url: String,
        reason: String,
    },
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn chat_llm_config(args: &Args) -> Result<LlmConfig, ConfigError> {
    let llm_type: LlmType = args.chat_llm_type.parse()?;
    let api_key = if !args.chat_api_key.is_empty() {
        Some(args.chat_api_key.clone())
    } else {
        None
    };
    Ok(LlmConfig {
        llm_type,
        api_key,
        completion_model: Some(args.chat_model.clone()).filter(|m| !m.trim().is_empty()),
        base_url: args.chat_base_url.clone(),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
    })
}
