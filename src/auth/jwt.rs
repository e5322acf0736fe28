//! JWT signing and verification, plus the API-facing auth error type

use super::Role;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

/// JWT signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User display name
    pub name: Option<String>,
    /// Role carried for informational purposes; identity resolution
    /// re-reads the role from the store
    pub role: Role,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enumeration
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl Claims {
    /// Create new access token claims
    pub fn new_access_token(user_id: String, name: Option<String>, role: Role) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(1); // Access token expires in 1 hour

        Self {
            sub: user_id,
            name,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_type: TokenType::Access,
        }
    }

    /// Create new refresh token claims
    pub fn new_refresh_token(user_id: String) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(30); // Refresh token expires in 30 days

        Self {
            sub: user_id,
            name: None,
            role: Role::User,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            token_type: TokenType::Refresh,
        }
    }

    /// Check if token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT token pair (access + refresh)
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPair {
    pub fn new(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: 3600, // 1 hour in seconds
        }
    }
}

/// Authentication and authorization errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authentication token")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Identity not found")]
    IdentityNotFound,
    #[error("Backing store unavailable")]
    StoreUnavailable { detail: Option<String> },
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Access denied")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing credentials")]
    MissingCredentials,
    #[error("Token creation failed")]
    TokenCreation,
    #[error("Invalid token type")]
    InvalidTokenType,
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let mut detail = None;

        let (status, error_code, message) = match self {
            AuthError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "missing_token",
                "Authorization header with a Bearer token is required".to_string(),
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid, malformed or expired token".to_string(),
            ),
            AuthError::IdentityNotFound => (
                StatusCode::UNAUTHORIZED,
                "identity_not_found",
                "No account matches the provided token".to_string(),
            ),
            AuthError::StoreUnavailable { detail: d } => {
                detail = d;
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_unavailable",
                    "Backing store is unavailable".to_string(),
                )
            }
            AuthError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication is required for this resource".to_string(),
            ),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Not authorized to access this resource".to_string(),
            ),
            AuthError::NotFound => (
                StatusCode::NOT_FOUND,
                "not_found",
                "Resource not found".to_string(),
            ),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "invalid_credentials",
                "Invalid email or password".to_string(),
            ),
            AuthError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "missing_credentials",
                "Required credentials were not provided".to_string(),
            ),
            AuthError::TokenCreation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "token_creation_failed",
                "Failed to create authentication token".to_string(),
            ),
            AuthError::InvalidTokenType => (
                StatusCode::UNAUTHORIZED,
                "invalid_token_type",
                "Invalid token type for this operation".to_string(),
            ),
            AuthError::Validation(message) => {
                (StatusCode::BAD_REQUEST, "validation_failed", message)
            }
            AuthError::Internal(internal) => {
                warn!("internal error surfaced to client: {}", internal);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": error_code,
            "message": message,
        });
        if let Some(detail) = detail {
            body["detail"] = json!(detail);
        }

        (status, Json(body)).into_response()
    }
}

/// JWT token utilities with injected signing keys
pub struct TokenService {
    keys: Keys,
}

impl TokenService {
    /// Create a token service from the configured signing secret
    pub fn new(secret: &str) -> Self {
        Self {
            keys: Keys::new(secret.as_bytes()),
        }
    }

    /// Generate access token
    pub fn generate_access_token(
        &self,
        user_id: String,
        name: Option<String>,
        role: Role,
    ) -> Result<String, AuthError> {
        let claims = Claims::new_access_token(user_id, name, role);
        encode(&Header::default(), &claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode JWT token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Generate refresh token
    pub fn generate_refresh_token(&self, user_id: String) -> Result<String, AuthError> {
        let claims = Claims::new_refresh_token(user_id);
        encode(&Header::default(), &claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode refresh token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Generate token pair
    pub fn generate_token_pair(
        &self,
        user_id: String,
        name: Option<String>,
        role: Role,
    ) -> Result<TokenPair, AuthError> {
        let access_token = self.generate_access_token(user_id.clone(), name, role)?;
        let refresh_token = self.generate_refresh_token(user_id)?;

        Ok(TokenPair::new(access_token, refresh_token))
    }

    /// Verify and decode token
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                AuthError::InvalidToken
            })?;

        let claims = token_data.claims;

        if claims.is_expired() {
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}
