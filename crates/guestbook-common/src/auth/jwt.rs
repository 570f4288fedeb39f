//! Host identity from bearer JWTs
//!
//! The subject claim is the host id that events are owned by. Tokens are
//! normally minted by the identity provider with the shared secret;
//! `issue_token` exists for tooling and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (host ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn host_id(&self) -> &str {
        &self.sub
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// JWT service for issuing and verifying host tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Sign a token for `host_id`
    ///
    /// # Errors
    /// Returns an error if the host id is blank or encoding fails
    pub fn issue_token(&self, host_id: &str) -> Result<String, AppError> {
        if host_id.trim().is_empty() {
            return Err(AppError::validation("host id must not be blank"));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: host_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("Failed to encode JWT: {e}")))
    }

    /// Verify signature and expiry and return the claims
    ///
    /// # Errors
    /// Returns an error if the token is malformed, forged, expired or has no subject
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            })?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("access_token_expiry", &self.access_token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_issue_and_validate() {
        let service = create_test_service();
        let token = service.issue_token("auth0|host-42").unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.host_id(), "auth0|host-42");
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_blank_host_rejected() {
        let service = create_test_service();
        assert!(matches!(
            service.issue_token("  "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();
        assert!(matches!(
            service.validate_token("invalid.token.here"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret() {
        let token = create_test_service().issue_token("host").unwrap();
        let other = JwtService::new("a-completely-different-secret-value", 900);
        assert!(matches!(
            other.validate_token(&token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let service = JwtService::new("test-secret-key-that-is-long-enough", -3600);
        let token = service.issue_token("host").unwrap();
        assert!(matches!(
            service.validate_token(&token),
            Err(AppError::TokenExpired)
        ));
    }
}
