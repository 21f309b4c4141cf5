//! Access tokens.
//!
//! [`AuthProvider`] is the seam the rest of the crate depends on; [`JwtService`]
//! is the HS256 implementation. Tokens carry the user id as `sub` and are
//! scoped to the `taskboard-api` audience.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACCESS_TOKEN_AUDIENCE: &str = "taskboard-api";

/// Default lifetime of an access token (24 hours).
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id, as a decimal string
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

pub trait AuthProvider: Send + Sync {
    fn issue(&self, user_id: i64) -> Result<IssuedToken, AuthError>;

    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError>;
}

#[derive(Clone)]
pub struct JwtService {
    secret: Arc<SecretString>,
    ttl: ChronoDuration,
}

impl JwtService {
    /// `secret` is base64 encoded.
    pub fn new(secret: SecretString, ttl: ChronoDuration) -> Self {
        Self {
            secret: Arc::new(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> ChronoDuration {
        self.ttl
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[ACCESS_TOKEN_AUDIENCE]);
        validation.required_spec_claims = HashSet::from([
            "sub".to_string(),
            "exp".to_string(),
            "aud".to_string(),
        ]);
        validation.leeway = 30;
        validation
    }
}

impl AuthProvider for JwtService {
    fn issue(&self, user_id: i64) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let expires_at = now + self.ttl;

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
        };

        let encoding_key = EncodingKey::from_base64_secret(self.secret.expose_secret())?;
        let token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)?;

        Ok(IssuedToken { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<VerifiedToken, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let decoding_key = DecodingKey::from_base64_secret(self.secret.expose_secret())?;
        let data = decode::<AccessTokenClaims>(token, &decoding_key, &Self::validation())
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?;
        let claims = data.claims;

        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::InvalidToken)?;
        let expires_at =
            DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;

        Ok(VerifiedToken {
            user_id,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    use super::*;

    fn test_secret() -> SecretString {
        let bytes: [u8; 32] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b,
            0x1c, 0x1d, 0x1e, 0x1f,
        ];
        SecretString::from(STANDARD.encode(bytes))
    }

    fn service() -> JwtService {
        JwtService::new(test_secret(), ChronoDuration::minutes(15))
    }

    fn sign(secret: &SecretString, claims: &AccessTokenClaims) -> String {
        let key = EncodingKey::from_base64_secret(secret.expose_secret()).unwrap();
        encode(&Header::new(Algorithm::HS256), claims, &key).unwrap()
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();
        let issued = service.issue(42).unwrap();
        let verified = service.verify(&issued.token).unwrap();

        assert_eq!(verified.user_id, 42);
        assert_eq!(verified.expires_at.timestamp(), issued.expires_at.timestamp());
    }

    #[test]
    fn test_expired_token() {
        let secret = test_secret();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: "1".to_string(),
            iat: (now - ChronoDuration::hours(2)).timestamp(),
            exp: (now - ChronoDuration::hours(1)).timestamp(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
        };

        let result = service().verify(&sign(&secret, &claims));
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_audience() {
        let secret = test_secret();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: "1".to_string(),
            iat: now.timestamp(),
            exp: (now + ChronoDuration::minutes(5)).timestamp(),
            aud: "connection".to_string(),
        };

        let result = service().verify(&sign(&secret, &claims));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_numeric_subject() {
        let secret = test_secret();
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: "alice".to_string(),
            iat: now.timestamp(),
            exp: (now + ChronoDuration::minutes(5)).timestamp(),
            aud: ACCESS_TOKEN_AUDIENCE.to_string(),
        };

        let result = service().verify(&sign(&secret, &claims));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret() {
        let other = SecretString::from(STANDARD.encode([0xffu8; 32]));
        let token = JwtService::new(other, ChronoDuration::minutes(5))
            .issue(1)
            .unwrap()
            .token;

        assert!(matches!(
            service().verify(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_and_empty_tokens() {
        let service = service();
        assert!(matches!(service.verify(""), Err(AuthError::InvalidToken)));
        assert!(matches!(
            service.verify("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }
}
