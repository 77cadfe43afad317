use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A pending invitation into the community chat.
///
/// At most one active request exists per user; repeat issuance returns the
/// existing token instead of minting a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: String,
    pub user_id: UserId,
    pub token: String,
    pub created_at: DateTime<Utc>,
}
