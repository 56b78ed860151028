//! Authentication service
//!
//! Implements registration, login, and bearer-token identity resolution
//! over the credential store. Emails are case-normalized (lowercased)
//! before any lookup or insert, so uniqueness is case-insensitive.

use crate::db::repositories::UserRepository;
use crate::models::User;
use crate::services::password::{hash_password, verify_password};
use crate::services::token::TokenService;
use anyhow::Context;
use std::sync::Arc;

/// Error types for authentication operations
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Email is already registered
    #[error("Email '{0}' is already registered")]
    EmailTaken(String),

    /// Invalid input (empty email or password)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Bad credentials, or a missing/invalid/expired token
    #[error("Authentication failed")]
    Unauthenticated,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Authentication service
///
/// Owns credential verification and token issuance. The token service is
/// constructed from startup configuration and injected here; nothing in
/// this module reads ambient state.
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(user_repo: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { user_repo, tokens }
    }

    /// Register a new user.
    ///
    /// Stores a one-way salted hash of the password, never the plaintext.
    /// New accounts are never administrators; admin users are provisioned
    /// directly in the store.
    pub async fn register(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = normalize_email(email);

        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::ValidationError(
                "A valid email address is required".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AuthError::ValidationError(
                "Password must not be empty".to_string(),
            ));
        }

        if self
            .user_repo
            .exists_by_email(&email)
            .await
            .context("Failed to check email")?
        {
            return Err(AuthError::EmailTaken(email));
        }

        let password_hash = hash_password(password).context("Failed to hash password")?;

        let user = User::new(email, password_hash, false);
        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(user_id = created.id, "Registered new user");

        Ok(created)
    }

    /// Login with credentials, returning a signed session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller; both fail with `Unauthenticated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);

        let user = self
            .user_repo
            .get_by_email(&email)
            .await
            .context("Failed to look up user")?
            .ok_or(AuthError::Unauthenticated)?;

        let password_valid = verify_password(password, &user.password_hash)
            .context("Failed to verify password")?;

        if !password_valid {
            return Err(AuthError::Unauthenticated);
        }

        let token = self.tokens.issue(&user).context("Failed to issue token")?;

        tracing::debug!(user_id = user.id, "Issued session token");

        Ok(token)
    }

    /// Resolve a bearer token to its user.
    ///
    /// Fails with `Unauthenticated` if the token is malformed, carries a
    /// bad signature, has expired, or its subject no longer exists.
    pub async fn resolve_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let user_id = claims
            .subject_id()
            .map_err(|_| AuthError::Unauthenticated)?;

        let user = self
            .user_repo
            .get_by_id(user_id)
            .await
            .context("Failed to load token subject")?
            .ok_or(AuthError::Unauthenticated)?;

        Ok(user)
    }
}

/// Lowercase and trim an email address
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
