//! PlanFloor REST backend
//!
//! A project-management API for flooring and renovation work: accounts,
//! projects with rooms/materials/files, uploads, and an authorization layer
//! with demo-mode fallbacks when the database is unavailable.

pub mod auth;
pub mod database;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::PlanfloorServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    Router::new()
        // API routes
        .nest("/api", routes::api_routes())
        // Uploaded files are served statically
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Add middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB max body size
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Include diagnostic detail in error responses
    pub dev_mode: bool,
    /// Substitute synthetic data when the database is unreachable.
    /// Test/staging environments only.
    pub demo_mode: bool,
    /// Database URL (optional)
    pub database_url: Option<String>,
    /// Directory for uploaded files
    pub upload_dir: String,
    /// JWT signing secret
    pub jwt_secret: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            demo_mode: false,
            database_url: None,
            upload_dir: "uploads".to_string(),
            jwt_secret: "planfloor-default-secret-change-in-production".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PLANFLOOR_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PLANFLOOR_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            dev_mode: std::env::var("PLANFLOOR_DEV_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            demo_mode: std::env::var("PLANFLOOR_DEMO_MODE")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            database_url: std::env::var("DATABASE_URL").ok(),
            upload_dir: std::env::var("PLANFLOOR_UPLOAD_DIR")
                .unwrap_or_else(|_| "uploads".to_string()),
            jwt_secret: std::env::var("PLANFLOOR_JWT_SECRET")
                .unwrap_or_else(|_| "planfloor-default-secret-change-in-production".to_string()),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "planfloor=debug,tower_http=debug,axum=debug".into()),
        )
        .init();
}
