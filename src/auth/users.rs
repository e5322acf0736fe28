//! User accounts: registration, login, token refresh, profile updates

use super::{
    jwt::{AuthError, TokenPair, TokenService, TokenType},
    AuthConfig, Identity, Role,
};
use crate::database::DatabaseService;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Demo login credentials accepted when the database is unavailable
const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_PASSWORD: &str = "floor123";

/// User registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Partial profile update
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Public user information
#[derive(Debug, Serialize, Clone)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Registration/login response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserInfo,
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
}

/// Internal user data with password hash
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserData {
    /// Create new user with hashed password
    pub fn new(name: String, email: String, password: &str, role: Role) -> Result<Self, AuthError> {
        let password_hash = hash_password(password)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        })
    }

    /// Verify password
    pub fn verify_password(&self, password: &str) -> bool {
        verify_password(password, &self.password_hash).unwrap_or(false)
    }

    /// Convert to public user info
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// User service for account operations, with demo fallback when the
/// database is unavailable
#[derive(Clone)]
pub struct UserService {
    db: Option<Arc<DatabaseService>>,
    tokens: Arc<TokenService>,
    config: AuthConfig,
}

impl UserService {
    pub fn new(
        db: Option<Arc<DatabaseService>>,
        tokens: Arc<TokenService>,
        config: AuthConfig,
    ) -> Self {
        Self { db, tokens, config }
    }

    fn store_unavailable(&self, detail: &str) -> AuthError {
        AuthError::StoreUnavailable {
            detail: self.config.dev_mode.then(|| detail.to_string()),
        }
    }

    /// Register new user
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        if request.name.is_empty() || request.email.is_empty() || request.password.is_empty() {
            debug!("Registration failed: missing credentials");
            return Err(AuthError::MissingCredentials);
        }

        if request.password.len() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        let Some(db) = &self.db else {
            if self.config.demo_mode {
                // Synthetic account, never persisted
                warn!("database unavailable, registering demo account");
                let user = UserInfo {
                    id: format!("usr_{}", Uuid::new_v4()),
                    name: request.name,
                    email: request.email,
                    role: Role::User,
                    created_at: Utc::now(),
                };
                let tokens = self.tokens.generate_token_pair(
                    user.id.clone(),
                    Some(user.name.clone()),
                    user.role,
                )?;
                return Ok(AuthResponse {
                    user,
                    tokens,
                    mode: Some("demo"),
                });
            }
            return Err(self.store_unavailable("no database configured"));
        };

        if db
            .email_exists(&request.email)
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?
        {
            return Err(AuthError::Validation(
                "An account with this email already exists".to_string(),
            ));
        }

        let user_data = UserData::new(request.name, request.email, &request.password, Role::User)?;
        db.insert_user(&user_data)
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?;

        info!("Registered new user: {}", user_data.email);

        let tokens = self.tokens.generate_token_pair(
            user_data.id.clone(),
            Some(user_data.name.clone()),
            user_data.role,
        )?;

        Ok(AuthResponse {
            user: user_data.to_user_info(),
            tokens,
            mode: None,
        })
    }

    /// Login user
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.email.is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(db) = &self.db else {
            if self.config.demo_mode {
                return self.demo_login(&request);
            }
            return Err(self.store_unavailable("no database configured"));
        };

        let user = db
            .find_user_by_email(&request.email)
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(&request.password) {
            warn!("Invalid password for user: {}", request.email);
            return Err(AuthError::InvalidCredentials);
        }

        debug!("User authenticated: {}", user.email);

        let tokens =
            self.tokens
                .generate_token_pair(user.id.clone(), Some(user.name.clone()), user.role)?;

        Ok(AuthResponse {
            user: user.to_user_info(),
            tokens,
            mode: None,
        })
    }

    /// Fixed-credential login used when the database is down
    fn demo_login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.email != DEMO_EMAIL || request.password != DEMO_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }

        warn!("database unavailable, issuing demo session");

        let user = UserInfo {
            id: self.config.demo_subject.clone(),
            name: "Demo User".to_string(),
            email: DEMO_EMAIL.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        };
        let tokens =
            self.tokens
                .generate_token_pair(user.id.clone(), Some(user.name.clone()), user.role)?;

        Ok(AuthResponse {
            user,
            tokens,
            mode: Some("demo"),
        })
    }

    /// Refresh access token
    pub async fn refresh_token(&self, request: RefreshRequest) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify_token(&request.refresh_token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::InvalidTokenType);
        }

        let Some(db) = &self.db else {
            if self.config.demo_mode && claims.sub == self.config.demo_subject {
                return self.tokens.generate_token_pair(
                    claims.sub,
                    Some("Demo User".to_string()),
                    Role::User,
                );
            }
            return Err(self.store_unavailable("no database configured"));
        };

        let user = db
            .find_user_by_id(&claims.sub)
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)?;

        self.tokens
            .generate_token_pair(user.id, Some(user.name), user.role)
    }

    /// Load the stored profile behind a resolved identity
    pub async fn current_user(&self, identity: &Identity) -> Result<UserInfo, AuthError> {
        if identity.is_demo() {
            return Ok(UserInfo {
                id: identity.id.clone(),
                name: identity
                    .display_name
                    .clone()
                    .unwrap_or_else(|| "Demo User".to_string()),
                email: DEMO_EMAIL.to_string(),
                role: identity.role,
                created_at: Utc::now(),
            });
        }

        let Some(db) = &self.db else {
            return Err(self.store_unavailable("no database configured"));
        };

        db.find_user_by_id(&identity.id)
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?
            .map(|u| u.to_user_info())
            .ok_or(AuthError::IdentityNotFound)
    }

    /// Apply a partial profile update. Demo identities have no stored
    /// profile to update.
    pub async fn update_profile(
        &self,
        identity: &Identity,
        request: UpdateProfileRequest,
    ) -> Result<UserInfo, AuthError> {
        if request.name.is_none() && request.email.is_none() {
            return Err(AuthError::Validation(
                "No profile fields provided for update".to_string(),
            ));
        }

        if identity.is_demo() {
            return Err(AuthError::Forbidden);
        }

        let Some(db) = &self.db else {
            return Err(self.store_unavailable("no database configured"));
        };

        let updated = db
            .update_user(
                &identity.id,
                request.name.as_deref(),
                request.email.as_deref(),
            )
            .await
            .map_err(|e| self.store_unavailable(&e.to_string()))?
            .ok_or(AuthError::IdentityNotFound)?;

        info!("Updated profile for user: {}", updated.id);
        Ok(updated.to_user_info())
    }
}

/// Hash password using Argon2
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::TokenCreation)
}

/// Verify password against hash
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidToken)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
