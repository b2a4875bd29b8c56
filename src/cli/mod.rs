use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "5001")]
    pub port: u16,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openai, groq, deepseek, xai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openai")]
    pub chat_llm_type: String,

    /// Base URL for the Chat LLM provider API (e.g., https://api.openai.com/v1)
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the provider type decide
    pub chat_base_url: Option<String>,

    /// API Key for the Chat LLM provider. Required for every provider except ollama.
    #[arg(long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., gpt-4o-mini, llama3)
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-4o-mini")]
    pub chat_model: String,

    /// Upper bound in seconds for a single provider call.
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "30")]
    pub request_timeout_secs: u64,

    // --- Persona Args ---
    /// Name the assistant speaks as.
    #[arg(long, env = "PERSONA_NAME", default_value = "the portfolio owner")]
    pub persona_name: String,

    /// Job title used in the system prompt.
    #[arg(long, env = "PERSONA_TITLE", default_value = "Software Development Engineer")]
    pub persona_title: String,

    /// Path to a plain-text summary appended to the system prompt.
    #[arg(long, env = "SUMMARY_PATH", default_value = "me/summary.txt")]
    pub summary_path: String,

    /// Path to the resume appended to the system prompt (plain text, or a PDF whose text is extracted).
    #[arg(long, env = "RESUME_PATH", default_value = "me/resume.txt")]
    pub resume_path: String,

    // --- Tool Args ---
    /// Offer the record_user_details / record_unknown_question tools to the model.
    #[arg(long, env = "ENABLE_TOOLS", default_value = "true", action = clap::ArgAction::Set)]
    pub enable_tools: bool,

    /// Maximum number of tool-call rounds within a single chat turn.
    #[arg(long, env = "MAX_TOOL_ROUNDS", default_value = "3")]
    pub max_tool_rounds: usize,
}

impl Args {
    /// `host:port`, with bare IPv6 literals bracketed (`[::]:5001`).
    pub fn server_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
