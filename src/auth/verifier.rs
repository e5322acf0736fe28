//! Credential verification: bearer token to caller identity
//!
//! The verifier is constructed once at startup with its configuration and
//! identity store injected; nothing here reads ambient process state.

use super::{
    jwt::{AuthError, TokenService, TokenType},
    Identity, IdentityMode, Role,
};
use crate::database::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Reserved subject id that short-circuits to a synthetic identity when
/// demo mode is enabled. Issued by the demo login flow.
pub const DEMO_SUBJECT_ID: &str = "64f0f1a84bf8dd2a0a7acdc1";

/// Configuration injected into the auth components at construction
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Allow synthetic fallback identities when the store is unreachable.
    /// Must only be enabled in test/staging environments.
    pub demo_mode: bool,
    /// Include diagnostic detail in store-failure responses
    pub dev_mode: bool,
    /// Subject id granted the demo short-circuit
    pub demo_subject: String,
}

impl AuthConfig {
    pub fn new(demo_mode: bool, dev_mode: bool) -> Self {
        Self {
            demo_mode,
            dev_mode,
            demo_subject: DEMO_SUBJECT_ID.to_string(),
        }
    }
}

/// Minimal identity record the verifier needs from the backing store
#[derive(Debug, Clone)]
pub struct StoredIdentity {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Backing identity store abstraction
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_identity(&self, id: &str) -> Result<Option<StoredIdentity>, StoreError>;
}

/// Resolves the raw `Authorization` header to an [`Identity`]
pub struct CredentialVerifier {
    tokens: Arc<TokenService>,
    config: AuthConfig,
    store: Option<Arc<dyn IdentityStore>>,
}

impl CredentialVerifier {
    pub fn new(
        tokens: Arc<TokenService>,
        config: AuthConfig,
        store: Option<Arc<dyn IdentityStore>>,
    ) -> Self {
        Self {
            tokens,
            config,
            store,
        }
    }

    /// Verify a bearer token and resolve the caller identity.
    ///
    /// Read-only; every rejection path returns an explicit error.
    pub async fn verify(&self, raw_header: Option<&str>) -> Result<Identity, AuthError> {
        let header = raw_header.ok_or(AuthError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::InvalidTokenType);
        }

        // Reserved demo subject wins over the store, even when the store is
        // reachable and holds a record for this id.
        if self.config.demo_mode && claims.sub == self.config.demo_subject {
            warn!(
                subject = %claims.sub,
                "demo subject token accepted without a store lookup"
            );
            return Ok(Identity {
                id: claims.sub,
                display_name: Some("Demo User".to_string()),
                role: Role::User,
                mode: IdentityMode::Demo,
            });
        }

        let lookup = match &self.store {
            Some(store) => store.find_identity(&claims.sub).await,
            None => Err(StoreError::Unavailable(
                "no identity store configured".to_string(),
            )),
        };

        match lookup {
            Ok(Some(stored)) => {
                debug!(user = %stored.id, "identity resolved from store");
                Ok(Identity {
                    id: stored.id,
                    display_name: Some(stored.name),
                    role: stored.role,
                    mode: IdentityMode::Persisted,
                })
            }
            Ok(None) => Err(AuthError::IdentityNotFound),
            Err(err) => {
                if self.config.demo_mode {
                    warn!(
                        subject = %claims.sub,
                        error = %err,
                        "identity store unreachable, substituting demo identity"
                    );
                    Ok(Identity {
                        id: claims.sub,
                        display_name: claims.name.or_else(|| Some("System User".to_string())),
                        role: Role::User,
                        mode: IdentityMode::Demo,
                    })
                } else {
                    error!(subject = %claims.sub, error = %err, "identity store unreachable");
                    Err(AuthError::StoreUnavailable {
                        detail: self.config.dev_mode.then(|| err.to_string()),
                    })
                }
            }
        }
    }
}
