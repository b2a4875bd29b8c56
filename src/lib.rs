pub mod agent;
pub mod models;
pub mod server;
pub mod config;
pub mod llm;
pub mod cli;
pub mod tools;

use agent::ChatAgent;
use cli::Args;
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {}", args.chat_base_url.as_deref().unwrap_or("provider default"));
    info!("Chat API Key Set: {}", !args.chat_api_key.is_empty());
    info!("Request Timeout: {}s", args.request_timeout_secs);
    info!("Persona: {} ({})", args.persona_name, args.persona_title);
    info!("Summary Path: {}", args.summary_path);
    info!("Resume Path: {}", args.resume_path);
    info!("Tools Enabled: {}", args.enable_tools);
    if args.enable_tools {
        info!("Max Tool Rounds: {}", args.max_tool_rounds);
    }
    info!("-------------------------");

    let agent = Arc::new(ChatAgent::new(&args)?);
    let addr = args.server_addr();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, agent);
    server.run().await?;

    Ok(())
}
