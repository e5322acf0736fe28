//! Authentication and authorization layer
//!
//! Every protected route resolves the caller to an [`Identity`] through the
//! [`CredentialVerifier`]; role and ownership checks build on top of it.

pub mod guard;
pub mod handlers;
pub mod jwt;
pub mod users;
pub mod verifier;


use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};

pub use guard::{authorize, check_ownership, Owned};
pub use jwt::{AuthError, Claims, TokenPair, TokenService, TokenType};
pub use users::{UserData, UserService};
pub use verifier::{AuthConfig, CredentialVerifier, IdentityStore, StoredIdentity, DEMO_SUBJECT_ID};

/// Coarse-grained permission class attached to an identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// How an identity was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    /// Resolved from a record in the backing store
    Persisted,
    /// Synthesized without a store lookup (demo fallback)
    Demo,
}

/// Resolved caller context, valid for the duration of one request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub mode: IdentityMode,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_demo(&self) -> bool {
        self.mode == IdentityMode::Demo
    }
}

impl<S> FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let raw_header = parts
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok());

        app_state.verifier.verify(raw_header).await
    }
}

/// Admin-only extractor; rejects non-admin identities with 403
pub struct AdminIdentity(pub Identity);

impl<S> FromRequestParts<S> for AdminIdentity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_request_parts(parts, state).await?;
        authorize(Some(&identity), &[Role::Admin])?;
        Ok(AdminIdentity(identity))
    }
}
