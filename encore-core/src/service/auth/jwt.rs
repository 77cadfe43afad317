use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{models::UserId, Error, Result};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Token type (always "access"; refresh credentials are opaque, stored
    /// values and never JWTs)
    pub typ: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_string(self.sub.clone())
    }

    #[must_use]
    pub fn is_access_token(&self) -> bool {
        self.typ == "access"
    }
}

/// Signs and verifies access tokens.
///
/// Stateless: verification needs only the signing secret and the clock,
/// never a store lookup. The secret is injected at construction; there is
/// no ambient key lookup anywhere else.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: Arc<EncodingKey>,
    decoding_key: Arc<DecodingKey>,
    algorithm: Algorithm,
    access_token_ttl: Duration,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with an HS256 secret
    pub fn new(secret: &[u8], access_token_ttl_minutes: i64) -> Result<Self> {
        if secret.is_empty() {
            return Err(Error::Internal("JWT secret must not be empty".to_string()));
        }
        if access_token_ttl_minutes <= 0 {
            return Err(Error::Internal(
                "Access token lifetime must be positive".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: Arc::new(EncodingKey::from_secret(secret)),
            decoding_key: Arc::new(DecodingKey::from_secret(secret)),
            algorithm: Algorithm::HS256,
            access_token_ttl: Duration::minutes(access_token_ttl_minutes),
        })
    }

    /// Sign an access token for a user.
    ///
    /// Returns the token together with its issue and expiry instants so
    /// callers can report them without re-decoding.
    pub fn sign_access_token(
        &self,
        user_id: &UserId,
    ) -> Result<(String, DateTime<Utc>, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + self.access_token_ttl;

        let claims = Claims {
            sub: user_id.as_str().to_string(),
            typ: "access".to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key)
            .map_err(|e| Error::Internal(format!("Failed to sign token: {e}")))?;

        Ok((token, now, expires_at))
    }

    /// Verify a token and extract claims.
    ///
    /// Fails with a distinct message for expiry so clients can tell "log in
    /// again" apart from "this token was never valid". An unexpected
    /// algorithm in the header is an invalid token.
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 60; // 60 seconds leeway for clock skew

        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    Error::Authentication("Token expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    Error::Authentication("Invalid token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    Error::Authentication("Invalid token signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => {
                    Error::Authentication("Unexpected signing algorithm".to_string())
                }
                _ => Error::Authentication(format!("Token verification failed: {e}")),
            })?;

        Ok(token_data.claims)
    }

    /// Verify an access token (convenience method)
    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        let claims = self.verify_token(token)?;
        if !claims.is_access_token() {
            return Err(Error::Authentication("Not an access token".to_string()));
        }
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-secret!";

    fn create_jwt_service() -> JwtService {
        JwtService::new(TEST_SECRET, 15).unwrap()
    }

    #[test]
    fn test_sign_and_verify_access_token() {
        let jwt = create_jwt_service();
        let user_id = UserId::new();

        let (token, issued_at, expires_at) = jwt.sign_access_token(&user_id).unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.as_str());
        assert!(claims.is_access_token());
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_expired_token_fails_with_expiry_error() {
        let jwt = create_jwt_service();
        let user_id = UserId::new();

        // Forge an already-expired token with the same secret (expired well
        // past the 60 s verification leeway).
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            typ: "access".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        let err = jwt.verify_access_token(&token).unwrap_err();
        assert!(matches!(err, Error::Authentication(msg) if msg.contains("expired")));
    }

    #[test]
    fn test_wrong_token_type_rejected() {
        let jwt = create_jwt_service();
        let user_id = UserId::new();

        let now = Utc::now();
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            typ: "refresh".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET),
        )
        .unwrap();

        assert!(jwt.verify_access_token(&token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let jwt = create_jwt_service();
        let result = jwt.verify_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_tampered_token() {
        let jwt = create_jwt_service();
        let user_id = UserId::new();

        let (token, _, _) = jwt.sign_access_token(&user_id).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[1] = "tampered_payload";
        let tampered_token = parts.join(".");

        let result = jwt.verify_token(&tampered_token);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = create_jwt_service();
        let other = JwtService::new(b"another-secret-another-secret-!!", 15).unwrap();
        let user_id = UserId::new();

        let (token, _, _) = other.sign_access_token(&user_id).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }
}
