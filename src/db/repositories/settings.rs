use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::entities::{blog_settings, global_settings, landing_pages};

/// Repository for the singleton document tables (landing page, blog
/// settings, global settings). Each table holds at most one row; saves
/// upsert that row in place.
pub struct SettingsRepository {
    conn: DatabaseConnection,
}

impl SettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_landing(&self) -> Result<Option<landing_pages::Model>> {
        Ok(landing_pages::Entity::find().one(&self.conn).await?)
    }

    pub async fn save_landing(&self, data: &str, user_id: &str) -> Result<landing_pages::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = landing_pages::Entity::find().one(&self.conn).await?;
        let saved = if let Some(row) = existing {
            let mut active: landing_pages::ActiveModel = row.into();
            active.data = Set(data.to_string());
            active.user_id = Set(user_id.to_string());
            active.updated_at = Set(now);
            active.update(&self.conn).await?
        } else {
            let model = landing_pages::ActiveModel {
                data: Set(data.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            model.insert(&self.conn).await?
        };

        Ok(saved)
    }

    pub async fn get_blog_settings(&self) -> Result<Option<blog_settings::Model>> {
        Ok(blog_settings::Entity::find().one(&self.conn).await?)
    }

    pub async fn save_blog_settings(
        &self,
        data: &str,
        user_id: &str,
    ) -> Result<blog_settings::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = blog_settings::Entity::find().one(&self.conn).await?;
        let saved = if let Some(row) = existing {
            let mut active: blog_settings::ActiveModel = row.into();
            active.data = Set(data.to_string());
            active.user_id = Set(user_id.to_string());
            active.updated_at = Set(now);
            active.update(&self.conn).await?
        } else {
            let model = blog_settings::ActiveModel {
                data: Set(data.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            model.insert(&self.conn).await?
        };

        Ok(saved)
    }

    pub async fn get_global_settings(&self) -> Result<Option<global_settings::Model>> {
        Ok(global_settings::Entity::find().one(&self.conn).await?)
    }

    pub async fn save_global_settings(
        &self,
        data: &str,
        user_id: &str,
    ) -> Result<global_settings::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let existing = global_settings::Entity::find().one(&self.conn).await?;
        let saved = if let Some(row) = existing {
            let mut active: global_settings::ActiveModel = row.into();
            active.data = Set(data.to_string());
            active.user_id = Set(user_id.to_string());
            active.updated_at = Set(now);
            active.update(&self.conn).await?
        } else {
            let model = global_settings::ActiveModel {
                data: Set(data.to_string()),
                user_id: Set(user_id.to_string()),
                created_at: Set(now.clone()),
                updated_at: Set(now),
                ..Default::default()
            };
            model.insert(&self.conn).await?
        };

        Ok(saved)
    }
}
