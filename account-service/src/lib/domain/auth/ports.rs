use async_trait::async_trait;

use crate::domain::auth::models::AccessToken;
use crate::user::errors::UserError;

/// Port for credential checks.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Verify email and password, and issue an access token for the user.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, malformed email, or wrong password
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError>;
}
