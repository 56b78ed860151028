//! User model
//!
//! Defines the User entity for the sweetshop backend.
//!
//! The role model is deliberately a two-tier boolean flag: a user either is
//! an administrator or is not. Nothing in the system needs a finer-grained
//! permission graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
///
/// The password hash is never serialized: any response type built from a
/// `User` is safe to return to a caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique, stored lowercased)
    pub email: String,
    /// Password hash (argon2, PHC string format)
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,
    /// Administrator flag
    pub is_admin: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`. The id is assigned by the
    /// database on insert.
    pub fn new(email: String, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: 0,
            email,
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }
}
