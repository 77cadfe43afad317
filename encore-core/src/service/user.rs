use sqlx::PgPool;

use crate::{
    models::{RoleFacts, User, UserId},
    repository::{RoleFactsRepository, UserRepository},
    Error, Result,
};

/// User profile lookups for authenticated callers.
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    role_facts: RoleFactsRepository,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish()
    }
}

impl UserService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            role_facts: RoleFactsRepository::new(pool),
        }
    }

    /// Profile plus current permissions. Fails NotFound if the user record
    /// has vanished since the token was issued.
    pub async fn get_profile(&self, user_id: &UserId) -> Result<(User, RoleFacts)> {
        let user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(|e| e.with_operation("load user"))?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))?;

        let facts = self
            .role_facts
            .get(user_id)
            .await
            .map_err(|e| e.with_operation("load role facts"))?;

        Ok((user, facts))
    }

    /// Get user by ID
    pub async fn get_user(&self, user_id: &UserId) -> Result<User> {
        self.users
            .get_by_id(user_id)
            .await
            .map_err(|e| e.with_operation("load user"))?
            .ok_or_else(|| Error::NotFound("user not found".to_string()))
    }
}
