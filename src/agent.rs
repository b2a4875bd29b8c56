use crate::cli::Args;
use crate::config::{ self, prompt::PersonaConfig };
use crate::llm::chat::{ ChatClient, ChatMessage, ProviderError, new_client as new_chat_client };
use crate::models::chat::ChatTurn;
use crate::tools;

use log::{ info, warn };
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;

/// Runs one chat turn against the provider. Immutable after construction and
/// shared across requests behind an `Arc`.
pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    system_prompt: Arc<str>,
    tools: Arc<[Value]>,
    max_tool_rounds: usize,
}

impl ChatAgent {
    pub fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let chat_config = config::chat_llm_config(args)?;
        let chat_client = new_chat_client(&chat_config)?;
        info!(
            "Chat client configured: Type={}, Model={}, BaseURL={}, Timeout={:?}",
            chat_config.llm_type,
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("adapter default"),
            chat_config.request_timeout
        );

        let persona = PersonaConfig::from_args(args);
        Ok(Self::with_client(chat_client, &persona, args.max_tool_rounds))
    }

    pub fn with_client(
        chat_client: Arc<dyn ChatClient>,
        persona: &PersonaConfig,
        max_tool_rounds: usize
    ) -> Self {
        let tools = if persona.tools_enabled { tools::definitions() } else { Vec::new() };
        Self {
            chat_client,
            system_prompt: Arc::from(persona.system_prompt()),
            tools: Arc::from(tools),
            max_tool_rounds,
        }
    }

    /// System instruction first, then the history in order, then the new message.
    pub fn build_messages(&self, message: &str, history: &[ChatTurn]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(&*self.system_prompt));
        messages.extend(history.iter().map(ChatMessage::from));
        messages.push(ChatMessage::user(message));
        messages
    }

    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatTurn],
        user_id: &str
    ) -> Result<String, ProviderError> {
        let mut messages = self.build_messages(message, history);
        let mut rounds = 0;

        loop {
            let completion = self.chat_client.complete(&messages, &self.tools).await?;

            // Tool calls are only honoured when tools were offered.
            if self.tools.is_empty() || !completion.requests_tools() {
                return completion.text().map(str::to_owned).ok_or(ProviderError::EmptyReply);
            }
            if rounds >= self.max_tool_rounds {
                warn!(
                    "Model still requesting tools after {} rounds; ending turn for {}",
                    rounds,
                    user_id
                );
                return completion.text().map(str::to_owned).ok_or(ProviderError::EmptyReply);
            }
            rounds += 1;

            let results: Vec<ChatMessage> = completion.tool_calls
                .iter()
                .map(|call| ChatMessage::tool_result(call.id.clone(), tools::execute(call, user_id)))
                .collect();
            messages.push(
                ChatMessage::assistant_tool_calls(completion.content, completion.tool_calls)
            );
            messages.extend(results);
        }
    }
}
