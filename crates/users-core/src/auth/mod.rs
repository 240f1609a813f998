//! Authentication service
//!
//! Registration and login against the user store. Passwords are hashed with
//! Argon2; login failures are uniform (`InvalidCredentials`) whether the
//! username or the password was wrong, so the endpoint does not leak which
//! accounts exist.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::jwt::JwtIssuer;
use crate::keys;
use crate::types::{CreateUserRequest, User, UserId};
use crate::user_store::{NewUser, UserStore};
use crate::validation;

/// The claim attached to every authenticated connection.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub user: User,
    pub access_token: String,
}

pub struct AuthenticationService {
    user_store: Arc<dyn UserStore>,
    jwt_issuer: JwtIssuer,
}

impl AuthenticationService {
    pub fn new(user_store: Arc<dyn UserStore>, jwt_issuer: JwtIssuer) -> Self {
        Self {
            user_store,
            jwt_issuer,
        }
    }

    /// Register a new account: validate, hash the password, provision the
    /// RSA key pair, insert.
    pub async fn register(&self, request: CreateUserRequest) -> Result<User> {
        validation::validate_username(&request.username)?;
        validation::validate_email(&request.email)?;
        validation::validate_password(&request.password)?;

        let password_hash = hash_password(&request.password)?;

        // Key generation grinds a CPU core for a moment; keep it off the
        // runtime threads.
        let pair = tokio::task::spawn_blocking(keys::generate_key_pair)
            .await
            .map_err(|e| Error::KeyGeneration(e.to_string()))??;

        let user = self
            .user_store
            .create_user(NewUser {
                username: request.username,
                email: request.email,
                password_hash,
                public_key: pair.public_pem,
                private_key: pair.private_pem,
            })
            .await?;

        info!(user_id = user.id, username = %user.username, "Registered user");
        Ok(user)
    }

    /// Verify credentials and issue an access token.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthenticationResult> {
        let user = match self.user_store.get_user_by_username(username).await? {
            Some(user) => user,
            None => {
                // Burn a verification anyway so unknown users cost the same
                // as wrong passwords.
                let _ = verify_password(password, DUMMY_HASH);
                warn!(username, "Login attempt for unknown user");
                return Err(Error::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash)? {
            warn!(username, "Login attempt with wrong password");
            return Err(Error::InvalidCredentials);
        }

        let access_token = self.jwt_issuer.create_access_token(&user)?;
        info!(user_id = user.id, username = %user.username, "User logged in");
        Ok(AuthenticationResult { user, access_token })
    }

    /// Validate a bearer token into the `CurrentUser` claim.
    pub fn verify_token(&self, token: &str) -> Result<CurrentUser> {
        let claims = self.jwt_issuer.validate_access_token(token)?;
        Ok(CurrentUser {
            user_id: claims.user_id()?,
            username: claims.username,
        })
    }
}

// A valid Argon2 hash of an arbitrary string, used to equalize timing for
// unknown-user logins.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_not_plaintext() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert_ne!(hash, "hunter2hunter2");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter2hunter2", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }
}
