use sqlx::PgPool;

use crate::{
    models::{ProfileHint, RoleFacts, User},
    repository::{RoleFactsRepository, UserRepository},
    Error, Result,
};

/// Identity store: maps a chat-platform identity to an internal user record.
///
/// Creation is idempotent under concurrent first-login: the repository
/// resolves races through the uniqueness constraint on the external id, so
/// repeated calls always land on the same internal user.
#[derive(Clone)]
pub struct IdentityService {
    users: UserRepository,
    role_facts: RoleFactsRepository,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService").finish()
    }
}

impl IdentityService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            role_facts: RoleFactsRepository::new(pool),
        }
    }

    /// Resolve the external identity to a user, creating the record on first
    /// sight and refreshing mutable profile fields otherwise.
    ///
    /// The returned flag reports whether the user is a recognized community
    /// member: a fact read from the store, never inferred from the token.
    pub async fn resolve_or_create(
        &self,
        telegram_id: i64,
        profile: &ProfileHint,
    ) -> Result<(User, bool)> {
        if telegram_id == 0 {
            return Err(Error::InvalidInput("telegram_id is required".to_string()));
        }

        let user = self
            .users
            .upsert_by_telegram(telegram_id, profile)
            .await
            .map_err(|e| e.with_operation("upsert user"))?;

        let facts = self
            .role_facts
            .get(&user.id)
            .await
            .map_err(|e| e.with_operation("load role facts"))?;

        tracing::debug!(
            user_id = %user.id,
            telegram_id,
            is_member = facts.is_member,
            "resolved chat identity"
        );

        Ok((user, facts.is_member))
    }

    /// Current role facts for a user
    pub async fn role_facts(&self, user: &User) -> Result<RoleFacts> {
        self.role_facts
            .get(&user.id)
            .await
            .map_err(|e| e.with_operation("load role facts"))
    }
}
