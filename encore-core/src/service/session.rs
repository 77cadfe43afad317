use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;

use crate::{
    models::{TokenPair, UserId},
    repository::{refresh_token::new_credential, RefreshTokenRepository, UserRepository},
    service::auth::JwtService,
    transaction::with_transaction,
    Error, Result,
};

/// Bytes of entropy in a refresh token
const REFRESH_TOKEN_BYTES: usize = 32;

/// Session issuer: turns a verified identity into a short-lived access
/// credential plus a rotatable refresh credential.
///
/// Knows nothing about permissions: it only asserts identity.
#[derive(Clone)]
pub struct SessionService {
    pool: PgPool,
    jwt: JwtService,
    refresh_tokens: RefreshTokenRepository,
    users: UserRepository,
    refresh_token_ttl: Duration,
    rotate_refresh_on_use: bool,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("rotate_refresh_on_use", &self.rotate_refresh_on_use)
            .finish()
    }
}

impl SessionService {
    #[must_use]
    pub fn new(
        pool: PgPool,
        jwt: JwtService,
        refresh_token_ttl_days: i64,
        rotate_refresh_on_use: bool,
    ) -> Self {
        Self {
            refresh_tokens: RefreshTokenRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
            jwt,
            refresh_token_ttl: Duration::days(refresh_token_ttl_days),
            rotate_refresh_on_use,
        }
    }

    /// Issue a fresh access/refresh pair for a user.
    pub async fn issue(&self, user_id: &UserId) -> Result<TokenPair> {
        let (access_token, issued_at, expires_at) = self.jwt.sign_access_token(user_id)?;

        let refresh_token = generate_refresh_token();
        let credential = new_credential(
            user_id.clone(),
            refresh_token.clone(),
            issued_at + self.refresh_token_ttl,
        );
        self.refresh_tokens
            .create(&credential)
            .await
            .map_err(|e| e.with_operation("store refresh token"))?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            issued_at,
            expires_at,
        })
    }

    /// Exchange a refresh token for a new access/refresh pair.
    ///
    /// The presented token is consumed and replaced in a single transaction
    /// (rotation-on-use): replaying it afterwards fails authentication. With
    /// rotation disabled the consumed row is re-inserted unchanged, keeping
    /// the token valid until its original expiry.
    pub async fn exchange(&self, refresh_token: &str) -> Result<TokenPair> {
        if refresh_token.is_empty() {
            return Err(Error::InvalidInput(
                "refresh_token is required".to_string(),
            ));
        }

        let repo = self.refresh_tokens.clone();
        let rotate = self.rotate_refresh_on_use;
        let ttl = self.refresh_token_ttl;
        let presented = refresh_token.to_string();

        let credential = with_transaction(&self.pool, move |tx| {
            Box::pin(async move {
                let consumed = repo
                    .consume_with_executor(&presented, &mut **tx)
                    .await?
                    .ok_or_else(|| {
                        Error::Authentication("Invalid or expired refresh token".to_string())
                    })?;

                let replacement = if rotate {
                    new_credential(
                        consumed.user_id.clone(),
                        generate_refresh_token(),
                        Utc::now() + ttl,
                    )
                } else {
                    consumed.clone()
                };
                repo.create_with_executor(&replacement, &mut **tx).await?;

                Ok(replacement)
            })
        })
        .await?;

        // The user record must still exist; a vanished user cannot refresh.
        self.users
            .get_by_id(&credential.user_id)
            .await
            .map_err(|e| e.with_operation("load user"))?
            .ok_or_else(|| Error::Authentication("User not found".to_string()))?;

        let (access_token, issued_at, expires_at) =
            self.jwt.sign_access_token(&credential.user_id)?;

        tracing::debug!(user_id = %credential.user_id, "refresh token exchanged");

        Ok(TokenPair {
            access_token,
            refresh_token: credential.token,
            issued_at,
            expires_at,
        })
    }

    /// Verify an access token and return the asserted user id
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.jwt.verify_access_token(token)?;
        Ok(claims.user_id())
    }
}

/// Generate an opaque refresh token: 32 bytes of randomness, URL-safe
/// encoding.
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_tokens_are_unique_and_url_safe() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();

        assert_ne!(a, b);
        // 32 bytes -> 43 base64 chars without padding
        assert_eq!(a.len(), 43);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
