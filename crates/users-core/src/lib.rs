//! # Users-Core
//!
//! User management and authentication for Ringline.
//!
//! This crate provides:
//! - User storage in SQLite
//! - Password authentication with Argon2
//! - Per-user RSA key-pair provisioning at registration
//! - JWT token issuance and validation
//!
//! The signaling core never sees any of this directly; it consumes a
//! `CurrentUser` claim and an existence check, both produced here.

pub mod auth;
pub mod error;
pub mod jwt;
pub mod keys;
pub mod types;
pub mod user_store;
pub mod validation;

pub use auth::{AuthenticationResult, AuthenticationService, CurrentUser};
pub use error::{Error, Result};
pub use jwt::{JwtConfig, JwtIssuer, UserClaims};
pub use types::{CreateUserRequest, User, UserId, UserSummary};
pub use user_store::{NewUser, SqliteUserStore, UserStore};

use std::sync::Arc;

/// Initialize the users-core service over a fresh store.
pub async fn init(database_url: &str, jwt: JwtConfig) -> Result<AuthenticationService> {
    let user_store = SqliteUserStore::new(database_url).await?;
    let jwt_issuer = JwtIssuer::new(jwt)?;
    Ok(AuthenticationService::new(Arc::new(user_store), jwt_issuer))
}
