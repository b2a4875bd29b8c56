pub mod api;

use crate::agent::ChatAgent;
use log::{ error, info };
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Server {
    addr: String,
    agent: Arc<ChatAgent>,
}

impl Server {
    pub fn new(addr: String, agent: Arc<ChatAgent>) -> Self {
        Self { addr, agent }
    }

    /// Binds the configured address. Hostnames are resolved, so `localhost:5001` works.
    pub async fn bind(&self) -> Result<TcpListener, Box<dyn Error + Send + Sync>> {
        TcpListener::bind(self.addr.as_str()).await.map_err(|e| {
            error!("Failed to bind HTTP server to {}: {}. Try a different port.", self.addr, e);
            format!("Failed to bind '{}': {}", self.addr, e).into()
        })
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let listener = self.bind().await?;
        info!("HTTP API server listening on: http://{}", listener.local_addr()?);

        let app = api::router(api::AppState::new(Arc::clone(&self.agent)));
        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
