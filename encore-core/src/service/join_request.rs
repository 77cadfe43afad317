use sqlx::PgPool;

use crate::{models::UserId, repository::JoinRequestRepository, Result};

/// Characters in a freshly minted invitation token
const INVITE_TOKEN_LEN: usize = 32;

/// Tracks whether a user has a pending invitation into the community.
///
/// One outstanding invitation token per user: repeated calls return the
/// existing token, the unique constraint resolves concurrent calls.
#[derive(Clone)]
pub struct JoinRequestService {
    repository: JoinRequestRepository,
    chat_invite_base_url: String,
}

impl std::fmt::Debug for JoinRequestService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JoinRequestService")
            .field("chat_invite_base_url", &self.chat_invite_base_url)
            .finish()
    }
}

impl JoinRequestService {
    #[must_use]
    pub fn new(pool: PgPool, chat_invite_base_url: String) -> Self {
        Self {
            repository: JoinRequestRepository::new(pool),
            chat_invite_base_url,
        }
    }

    /// Return the user's invitation token, minting one on first call.
    pub async fn ensure(&self, user_id: &UserId) -> Result<String> {
        let candidate = nanoid::nanoid!(INVITE_TOKEN_LEN);
        let request = self
            .repository
            .ensure(user_id, &candidate)
            .await
            .map_err(|e| e.with_operation("ensure join request"))?;

        Ok(request.token)
    }

    /// Render the invitation URL the bot hands to a prospective member.
    #[must_use]
    pub fn invite_url(&self, token: &str) -> String {
        format!("{}?start={token}", self.chat_invite_base_url)
    }

    /// Convenience: ensure a token and render its URL in one step.
    pub async fn ensure_invite_url(&self, user_id: &UserId) -> Result<String> {
        let token = self.ensure(user_id).await?;
        Ok(self.invite_url(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invite_url_embeds_the_token() {
        let service = JoinRequestService {
            repository: JoinRequestRepository::new(
                sqlx::PgPool::connect_lazy("postgresql://fake").expect("lazy pool"),
            ),
            chat_invite_base_url: "https://t.me/joinchat".to_string(),
        };

        assert_eq!(
            service.invite_url("abc123"),
            "https://t.me/joinchat?start=abc123"
        );
    }
}
