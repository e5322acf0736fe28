//! PlanFloor Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main PlanFloor web server
pub struct PlanfloorServer {
    config: WebConfig,
    state: AppState,
}

impl PlanfloorServer {
    /// Create a new PlanFloor server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("🚀 Starting PlanFloor API server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Demo mode: {}", self.config.demo_mode);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to install shutdown signal handler: {}", e);
    }
    info!("Shutdown signal received, closing server...");
}

/// Builder for PlanfloorServer
pub struct PlanfloorServerBuilder {
    config: WebConfig,
}

impl PlanfloorServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode (diagnostic detail in error responses)
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Enable demo-mode fallbacks
    pub fn demo_mode(mut self, demo_mode: bool) -> Self {
        self.config.demo_mode = demo_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    /// Set the upload directory
    pub fn upload_dir<S: Into<String>>(mut self, upload_dir: S) -> Self {
        self.config.upload_dir = upload_dir.into();
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<PlanfloorServer> {
        PlanfloorServer::new(self.config).await
    }
}

impl Default for PlanfloorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to start a server with configuration from the
/// environment
pub async fn start_server() -> WebResult<()> {
    let config = WebConfig::from_env();
    let server = PlanfloorServer::new(config).await?;
    server.start().await
}
