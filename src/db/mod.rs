use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::{blog_settings, global_settings, landing_pages, pages, posts};

pub mod migrator;
pub mod repositories;

pub use repositories::page::NewPage;
pub use repositories::post::{NewPost, PostUpdate};
pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // Every sqlx connection to sqlite::memory: opens its own empty
        // database, so the pool must never grow past one connection there.
        let (max_connections, min_connections) = if db_url.contains(":memory:") {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn post_repo(&self) -> repositories::post::PostRepository {
        repositories::post::PostRepository::new(self.conn.clone())
    }

    fn page_repo(&self) -> repositories::page::PageRepository {
        repositories::page::PageRepository::new(self.conn.clone())
    }

    fn settings_repo(&self) -> repositories::settings::SettingsRepository {
        repositories::settings::SettingsRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    // ========== Posts ==========

    pub async fn list_posts(&self, include_unpublished: bool) -> Result<Vec<posts::Model>> {
        self.post_repo().list(include_unpublished).await
    }

    pub async fn get_post(
        &self,
        id: i32,
        include_unpublished: bool,
    ) -> Result<Option<posts::Model>> {
        self.post_repo().get(id, include_unpublished).await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<posts::Model> {
        self.post_repo().create(post).await
    }

    pub async fn update_post(&self, id: i32, update: &PostUpdate) -> Result<Option<posts::Model>> {
        self.post_repo().update(id, update).await
    }

    pub async fn delete_post(&self, id: i32) -> Result<bool> {
        self.post_repo().delete(id).await
    }

    pub async fn count_posts(&self) -> Result<u64> {
        self.post_repo().count_total().await
    }

    pub async fn count_published_posts(&self) -> Result<u64> {
        self.post_repo().count_published().await
    }

    // ========== Pages ==========

    pub async fn get_page_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<Option<pages::Model>> {
        self.page_repo().get_by_slug(slug, include_unpublished).await
    }

    pub async fn create_page(&self, page: &NewPage) -> Result<pages::Model> {
        self.page_repo().create(page).await
    }

    // ========== Singleton documents ==========

    pub async fn get_landing(&self) -> Result<Option<landing_pages::Model>> {
        self.settings_repo().get_landing().await
    }

    pub async fn save_landing(&self, data: &str, user_id: &str) -> Result<landing_pages::Model> {
        self.settings_repo().save_landing(data, user_id).await
    }

    pub async fn get_blog_settings(&self) -> Result<Option<blog_settings::Model>> {
        self.settings_repo().get_blog_settings().await
    }

    pub async fn save_blog_settings(
        &self,
        data: &str,
        user_id: &str,
    ) -> Result<blog_settings::Model> {
        self.settings_repo().save_blog_settings(data, user_id).await
    }

    pub async fn get_global_settings(&self) -> Result<Option<global_settings::Model>> {
        self.settings_repo().get_global_settings().await
    }

    pub async fn save_global_settings(
        &self,
        data: &str,
        user_id: &str,
    ) -> Result<global_settings::Model> {
        self.settings_repo()
            .save_global_settings(data, user_id)
            .await
    }

    // ========== Users ==========

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(&self, email: &str, password: &str) -> Result<User> {
        self.user_repo().create(email, password).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        self.user_repo().update_password(user_id, new_password).await
    }

    pub async fn update_user_email(&self, user_id: &str, new_email: &str) -> Result<User> {
        self.user_repo().update_email(user_id, new_email).await
    }

    // ========== Tokens ==========

    pub async fn create_token(&self, user_id: &str, ttl_hours: i64) -> Result<String> {
        self.token_repo().create(user_id, ttl_hours).await
    }

    pub async fn verify_token(&self, token: &str) -> Result<Option<String>> {
        self.token_repo().verify(token).await
    }

    pub async fn revoke_token(&self, token: &str) -> Result<()> {
        self.token_repo().revoke(token).await
    }

    pub async fn revoke_user_tokens(&self, user_id: &str) -> Result<u64> {
        self.token_repo().revoke_all_for_user(user_id).await
    }

    pub async fn purge_expired_tokens(&self) -> Result<u64> {
        self.token_repo().purge_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_shares_a_single_database() {
        let store = Store::with_pool_options("sqlite::memory:", 5, 1)
            .await
            .unwrap();

        // Concurrent queries must all see the migrated schema; a second
        // pooled connection would land in a separate empty database.
        let (a, b, c) = tokio::join!(
            store.count_posts(),
            store.count_published_posts(),
            store.count_posts(),
        );
        assert_eq!(a.unwrap(), 0);
        assert_eq!(b.unwrap(), 0);
        assert_eq!(c.unwrap(), 0);
    }
}
