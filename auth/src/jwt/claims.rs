use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token payload.
///
/// Serialized as `{ "userId": .., "iat": .., "exp": .. }`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Store-assigned identifier of the authenticated user
    #[serde(rename = "userId")]
    pub user_id: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user, valid from now for `ttl`.
    ///
    /// An expiry past the representable range saturates instead of overflowing.
    pub fn for_user(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .map_or(i64::MAX, |expires_at| expires_at.timestamp());

        Self {
            user_id,
            iat: now.timestamp(),
            exp,
        }
    }
}
