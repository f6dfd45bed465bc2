//! `SeaORM` implementation of the `AuthService` trait.

use crate::config::AuthConfig;
use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, Identity, LoginResult, UserInfo};
use async_trait::async_trait;
use tracing::{info, warn};

pub struct SeaOrmAuthService {
    store: Store,
    config: AuthConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, config: AuthConfig) -> Self {
        Self { store, config }
    }

    /// Provision the configured admin identity if this is its first login
    /// attempt. Any other unknown email falls through to the uniform
    /// invalid-credentials path.
    async fn bootstrap_admin(&self, email: &str) -> Result<(), AuthError> {
        if email != self.config.admin_email || self.config.admin_password.is_empty() {
            return Ok(());
        }

        if self.store.get_user_by_email(email).await?.is_some() {
            return Ok(());
        }

        self.store
            .create_user(email, &self.config.admin_password)
            .await?;
        info!("Provisioned admin user on first login");
        Ok(())
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, AuthError> {
        self.bootstrap_admin(email).await?;

        // Opportunistic cleanup of the token table; failures here must not
        // block login.
        if let Err(e) = self.store.purge_expired_tokens().await {
            warn!("Failed to purge expired tokens: {e}");
        }

        let is_valid = self.store.verify_user_password(email, password).await?;
        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self
            .store
            .create_token(&user.id, self.config.token_ttl_hours)
            .await?;

        Ok(LoginResult {
            token,
            user: UserInfo {
                id: user.id,
                email: user.email,
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        })
    }

    async fn verify_token(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let Some(user_id) = self.store.verify_token(token).await? else {
            return Ok(None);
        };

        // Identity is looked up by the subject stored with the token, so a
        // token always resolves to the user it was minted for.
        let user = self
            .store
            .get_user_by_id(&user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Some(Identity {
            id: user.id,
            email: user.email,
        }))
    }

    async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.revoke_token(token).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let user = self
            .store
            .get_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let is_valid = self
            .store
            .verify_user_password(&user.email, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(user_id, new_password)
            .await?;

        // Outstanding bearer tokens were minted against the old credential.
        let revoked = self.store.revoke_user_tokens(user_id).await?;
        info!("Password changed; revoked {revoked} outstanding token(s)");

        Ok(())
    }

    async fn change_email(&self, user_id: &str, new_email: &str) -> Result<UserInfo, AuthError> {
        if !new_email.contains('@') {
            return Err(AuthError::Validation(
                "New email address is not valid".to_string(),
            ));
        }

        if let Some(existing) = self.store.get_user_by_email(new_email).await?
            && existing.id != user_id
        {
            return Err(AuthError::Validation(
                "Email address is already in use".to_string(),
            ));
        }

        let user = self.store.update_user_email(user_id, new_email).await?;

        Ok(UserInfo {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}
