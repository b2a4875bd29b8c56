use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, StatusCode, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{ ChatClient, ChatMessage, Completion, ProviderError, ToolCall };
use crate::config::ConfigError;
use crate::llm::LlmConfig;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const MAX_ERROR_BODY: usize = 512;

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [Value]>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIReplyMessage,
}

#[derive(Deserialize)]
struct OpenAIReplyMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: String,
        timeout: Duration
    ) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Url::parse(&base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e|
                ConfigError::InvalidApiKey(e.to_string())
            )?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder().default_headers(headers).timeout(timeout).build()?;

        Ok(Self {
            http,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        let api_key = config.api_key.clone().filter(|k| !k.trim().is_empty());
        if api_key.is_none() && config.llm_type.requires_api_key() {
            return Err(ConfigError::MissingApiKey(config.llm_type));
        }

        let base_url = config.base_url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| config.llm_type.default_base_url().to_string());

        Self::new(api_key, config.completion_model.clone(), base_url, config.request_timeout)
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout)
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value]
    ) -> Result<Completion, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let req = OpenAIChatRequest {
            model: &self.model,
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
        };

        debug!("POST {} ({} messages, {} tools)", url, messages.len(), tools.len());
        let resp = self.http
            .post(&url)
            .json(&req)
            .send().await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = truncate_body(resp.text().await.unwrap_or_default());
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimited(body));
            }
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await.map_err(|e| self.map_transport_error(e))?;
        let parsed: OpenAIResponse = serde_json
            ::from_slice(&bytes)
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let choice = parsed.choices.into_iter().next().ok_or(ProviderError::EmptyReply)?;

        Ok(Completion {
            content: choice.message.content,
            tool_calls: choice.message.tool_calls.unwrap_or_default(),
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
