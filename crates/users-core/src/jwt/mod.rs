//! JWT token issuance and validation

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{User, UserId};

/// JWT issuer
pub struct JwtIssuer {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
}

/// JWT claims for user access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    // Standard claims
    pub iss: String,
    pub sub: String, // user id
    pub exp: u64,
    pub iat: u64,
    pub jti: String,

    // Custom claims
    pub username: String,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub access_ttl_seconds: u64,
    /// HS256 signing secret (the server-wide `SECRET_KEY`).
    pub secret: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "https://ringline.local".to_string(),
            access_ttl_seconds: 86400, // one day, the length of a login session
            secret: "change-me-in-production".to_string(),
        }
    }
}

impl JwtIssuer {
    pub fn new(config: JwtConfig) -> Result<Self> {
        if config.secret.is_empty() {
            return Err(Error::Config("JWT secret must not be empty".to_string()));
        }
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Ok(Self {
            header: Header::new(Algorithm::HS256),
            encoding_key,
            decoding_key,
            config,
        })
    }

    pub fn create_access_token(&self, user: &User) -> Result<String> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::seconds(self.config.access_ttl_seconds as i64);

        let claims = UserClaims {
            iss: self.config.issuer.clone(),
            sub: user.id.to_string(),
            exp: exp.timestamp() as u64,
            iat: now.timestamp() as u64,
            jti: Uuid::new_v4().to_string(),
            username: user.username.clone(),
        };

        encode(&self.header, &claims, &self.encoding_key).map_err(Error::Jwt)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<UserClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.config.issuer.clone()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let token_data =
            decode::<UserClaims>(token, &self.decoding_key, &validation).map_err(Error::Jwt)?;
        Ok(token_data.claims)
    }
}

impl UserClaims {
    pub fn user_id(&self) -> Result<UserId> {
        self.sub
            .parse()
            .map_err(|_| Error::Config(format!("Malformed subject claim: {}", self.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user() -> User {
        User {
            id: 42,
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "hash".into(),
            public_key: None,
            private_key: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let issuer = JwtIssuer::new(JwtConfig::default()).unwrap();
        let token = issuer.create_access_token(&user()).unwrap();
        let claims = issuer.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtIssuer::new(JwtConfig::default()).unwrap();
        let token = issuer.create_access_token(&user()).unwrap();

        let other = JwtIssuer::new(JwtConfig {
            secret: "a-different-secret".into(),
            ..JwtConfig::default()
        })
        .unwrap();
        assert!(other.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_empty_secret_is_refused() {
        let result = JwtIssuer::new(JwtConfig {
            secret: String::new(),
            ..JwtConfig::default()
        });
        assert!(result.is_err());
    }
}
