use anyhow::{Context, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{auth_tokens, prelude::*};

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Mint a fresh bearer token for `user_id` with the given lifetime.
    pub async fn create(&self, user_id: &str, ttl_hours: i64) -> Result<String> {
        let token = generate_token();
        let now = chrono::Utc::now();
        let expires = now + chrono::Duration::hours(ttl_hours);

        let model = auth_tokens::ActiveModel {
            token: Set(token.clone()),
            user_id: Set(user_id.to_string()),
            created_at: Set(now.to_rfc3339()),
            expires_at: Set(expires.to_rfc3339()),
        };

        model
            .insert(&self.conn)
            .await
            .context("Failed to insert auth token")?;

        Ok(token)
    }

    /// Resolve a token to the user id it was minted for. Expired tokens are
    /// treated as absent and removed.
    pub async fn verify(&self, token: &str) -> Result<Option<String>> {
        let row = AuthTokens::find_by_id(token)
            .one(&self.conn)
            .await
            .context("Failed to query auth token")?;

        let Some(row) = row else {
            return Ok(None);
        };

        if row.expires_at <= chrono::Utc::now().to_rfc3339() {
            AuthTokens::delete_by_id(token).exec(&self.conn).await?;
            return Ok(None);
        }

        Ok(Some(row.user_id))
    }

    /// Revoke a token. Idempotent: revoking an absent token is not an error.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        AuthTokens::delete_by_id(token).exec(&self.conn).await?;
        Ok(())
    }

    /// Revoke every outstanding token for a user (after password changes).
    pub async fn revoke_all_for_user(&self, user_id: &str) -> Result<u64> {
        let result = AuthTokens::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }

    /// Drop expired rows. Called opportunistically from the login path.
    pub async fn purge_expired(&self) -> Result<u64> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = AuthTokens::delete_many()
            .filter(auth_tokens::Column::ExpiresAt.lte(now))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}

/// Generate a random bearer token (64 character hex string)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;

    async fn test_repo() -> TokenRepository {
        let store = Store::new("sqlite::memory:").await.unwrap();
        store.token_repo()
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_removed() {
        let repo = test_repo().await;
        let token = repo.create("user-1", -1).await.unwrap();

        assert!(repo.verify(&token).await.unwrap().is_none());

        // The row was deleted on verification, not just ignored.
        let row = AuthTokens::find_by_id(token.as_str())
            .one(&repo.conn)
            .await
            .unwrap();
        assert!(row.is_none());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_rows() {
        let repo = test_repo().await;
        let stale = repo.create("user-1", -1).await.unwrap();
        let fresh = repo.create("user-1", 24).await.unwrap();

        assert_eq!(repo.purge_expired().await.unwrap(), 1);
        assert!(repo.verify(&stale).await.unwrap().is_none());
        assert_eq!(
            repo.verify(&fresh).await.unwrap().as_deref(),
            Some("user-1")
        );
    }
}
