use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;

use crate::domain::auth::models::AccessToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::EmailAddress;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;

/// Login against the user store.
///
/// Every credential failure surfaces as `UserError::InvalidCredentials`, so
/// callers cannot tell an unknown email from a wrong password. An unknown
/// email still pays for one hash verification against `timing_hash`.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    timing_hash: String,
}

/// Hashed once at start-up; never matches a stored account.
const TIMING_PASSWORD: &str = "timing-equaliser-for-unknown-accounts";

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    pub fn new(repository: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        let timing_hash = authenticator
            .hash_password(TIMING_PASSWORD)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to prepare timing hash");
                String::new()
            });

        Self {
            repository,
            authenticator,
            timing_hash,
        }
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, UserError> {
        let email = EmailAddress::new(email.to_string()).map_err(|_| {
            let _ = self.authenticator.verify_password(password, &self.timing_hash);
            tracing::warn!("Login rejected: malformed email");
            UserError::InvalidCredentials
        })?;

        let user = self
            .repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| {
                let _ = self.authenticator.verify_password(password, &self.timing_hash);
                tracing::warn!("Login rejected: unknown email");
                UserError::InvalidCredentials
            })?;

        let result = self
            .authenticator
            .authenticate(password, &user.password_hash, user.id.0)
            .map_err(|e| match e {
                AuthenticationError::InvalidCredentials => {
                    tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
                    UserError::InvalidCredentials
                }
                AuthenticationError::JwtError(err) => {
                    UserError::Unknown(format!("Token generation failed: {}", err))
                }
            })?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(AccessToken(result.access_token))
    }
}
