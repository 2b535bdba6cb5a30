//! JWT service for credential issuance and validation
//!
//! Access and refresh tokens are signed HS256 with separate secrets. The
//! refresh token is additionally persisted on the user row (single active
//! session per user); matching against that stored value happens in the
//! user repository, this module only covers the token crypto.

use anyhow::Result;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::config::JwtConfig;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
    /// Token type (access or refresh)
    pub token_type: TokenType,
}

/// Token type enum
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

/// A freshly issued access/refresh credential pair
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// JWT service
#[derive(Clone)]
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
    config: JwtConfig,
}

impl TokenService {
    /// Initialize a new token service
    pub fn new(config: JwtConfig) -> Self {
        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            validation,
            config,
        }
    }

    /// Issue a new access/refresh pair for a user
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.generate(user_id, TokenType::Access)?,
            refresh_token: self.generate(user_id, TokenType::Refresh)?,
        })
    }

    fn generate(&self, user_id: Uuid, token_type: TokenType) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let (expiry, key) = match token_type {
            TokenType::Access => (self.config.access_token_expiry, &self.access_encoding),
            TokenType::Refresh => (self.config.refresh_token_expiry, &self.refresh_encoding),
        };

        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + expiry,
            token_type,
        };

        let token = encode(&Header::new(jsonwebtoken::Algorithm::HS256), &claims, key)?;
        Ok(token)
    }

    /// Validate an access token and return the claims
    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        self.verify(token, TokenType::Access, &self.access_decoding)
    }

    /// Validate a refresh token and return the claims
    pub fn verify_refresh(&self, token: &str) -> Result<Claims> {
        self.verify(token, TokenType::Refresh, &self.refresh_decoding)
    }

    fn verify(&self, token: &str, expected: TokenType, key: &DecodingKey) -> Result<Claims> {
        let token_data = decode::<Claims>(token, key, &self.validation)?;

        if token_data.claims.token_type != expected {
            anyhow::bail!("Token type mismatch");
        }

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> TokenService {
        TokenService::new(JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 864_000,
        })
    }

    #[test]
    fn test_issue_and_verify_pair() {
        let service = test_service();
        let user_id = Uuid::new_v4();

        let pair = service.issue_pair(user_id).unwrap();

        let access = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(access.sub, user_id);
        assert_eq!(access.token_type, TokenType::Access);

        let refresh = service.verify_refresh(&pair.refresh_token).unwrap();
        assert_eq!(refresh.sub, user_id);
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_token_type_mismatch_is_rejected() {
        let service = test_service();
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        // An access token presented on the refresh path (and vice versa)
        // fails even before the stored-value comparison.
        assert!(service.verify_refresh(&pair.access_token).is_err());
        assert!(service.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let service = test_service();
        let pair = service.issue_pair(Uuid::new_v4()).unwrap();

        let mut tampered = pair.access_token.clone();
        tampered.pop();
        tampered.push('x');
        assert!(service.verify_access(&tampered).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_service();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 2000,
            exp: now - 1000,
            token_type: TokenType::Access,
        };
        let token = encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("test-access-secret".as_bytes()),
        )
        .unwrap();

        assert!(service.verify_access(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let service = test_service();
        let other = TokenService::new(JwtConfig {
            access_secret: "different-secret".to_string(),
            refresh_secret: "different-refresh".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 864_000,
        });

        let pair = other.issue_pair(Uuid::new_v4()).unwrap();
        assert!(service.verify_access(&pair.access_token).is_err());
    }
}
