//! Application state wiring: database, token service, verifier, users

use crate::{
    auth::{AuthConfig, CredentialVerifier, IdentityStore, TokenService, UserService},
    database::DatabaseService,
    WebConfig, WebError, WebResult,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
///
/// The demo-mode flag and JWT secret are copied into the auth components
/// here, at construction; nothing reads them ambiently afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Database service; `None` when the store is unreachable
    pub database: Option<Arc<DatabaseService>>,
    /// Credential verifier resolving bearer tokens to identities
    pub verifier: Arc<CredentialVerifier>,
    /// User account service
    pub user_service: UserService,
}

impl AppState {
    /// Create a new application state
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let auth_config = AuthConfig::new(config.demo_mode, config.dev_mode);
        let tokens = Arc::new(TokenService::new(&config.jwt_secret));

        // The database is optional: a failed connection leaves the server
        // running with demo-mode fallbacks (or explicit 500s) instead.
        let database = match &config.database_url {
            Some(database_url) => match DatabaseService::new(database_url).await {
                Ok(db) => {
                    info!("Database initialized successfully");
                    Some(Arc::new(db))
                }
                Err(e) => {
                    warn!("Failed to initialize database: {}", e);
                    None
                }
            },
            None => None,
        };

        if database.is_none() {
            if config.demo_mode {
                warn!("Running without a database: demo-mode fallbacks are active");
            } else {
                warn!("Running without a database and demo mode is disabled; most endpoints will fail");
            }
        }

        let identity_store = database
            .clone()
            .map(|db| db as Arc<dyn IdentityStore>);
        let verifier = Arc::new(CredentialVerifier::new(
            tokens.clone(),
            auth_config.clone(),
            identity_store,
        ));

        let user_service = UserService::new(database.clone(), tokens, auth_config);

        tokio::fs::create_dir_all(&config.upload_dir)
            .await
            .map_err(|e| {
                WebError::Config(format!(
                    "failed to create upload directory {}: {}",
                    config.upload_dir, e
                ))
            })?;

        info!("Application state initialized successfully");
        Ok(Self {
            config,
            database,
            verifier,
            user_service,
        })
    }
}
