pub mod openai;

use async_trait::async_trait;
use serde::{ Deserialize, Serialize };
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use super::LlmConfig;
use crate::config::ConfigError;
use self::openai::OpenAIChatClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry of the prompt sequence sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn text(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::text(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(MessageRole::User, content)
    }

    /// Assistant turn that asked for tools; echoed back so the provider can match results.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
            tool_calls,
            tool_call_id: None,
        }
    }

    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object, exactly as the model produced it.
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// First choice of a completion reply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Completion {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl Completion {
    pub fn requests_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Reply text, if the model produced any that is not just whitespace.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider unreachable: {0}")]
    Transport(String),
    #[error("provider rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("provider returned HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },
    #[error("provider reply could not be parsed: {0}")]
    Parse(String),
    #[error("provider reply contained no text")]
    EmptyReply,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Runs one completion over `messages`. `tools` holds JSON function
    /// definitions; an empty slice sends none.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[Value]
    ) -> Result<Completion, ProviderError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigError> {
    // Every supported backend speaks the chat-completions format; the type only
    // decides the default endpoint and whether a key is mandatory.
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
