//! Core types for users-core

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID type, shared with the session layer.
pub type UserId = i64;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// SPKI PEM, provisioned at registration. Opaque to everything but the
    /// clients exchanging it.
    pub public_key: Option<String>,
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a new user. The password arrives in plaintext and is
/// hashed by the authentication service before it reaches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// The slice of a user exposed in listings: enough to place a call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}
