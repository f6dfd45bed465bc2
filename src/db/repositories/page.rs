use anyhow::Result;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{pages, prelude::*};

#[derive(Debug, Clone)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub meta_description: String,
    pub published: bool,
    pub user_id: String,
}

pub struct PageRepository {
    conn: DatabaseConnection,
}

impl PageRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Look up a page by its public slug. Unpublished pages are only visible
    /// when `include_unpublished` is set.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_unpublished: bool,
    ) -> Result<Option<pages::Model>> {
        let page = Pages::find()
            .filter(pages::Column::Slug.eq(slug))
            .one(&self.conn)
            .await?;

        Ok(page.filter(|p| p.published || include_unpublished))
    }

    pub async fn create(&self, page: &NewPage) -> Result<pages::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = pages::ActiveModel {
            title: Set(page.title.clone()),
            slug: Set(page.slug.clone()),
            content: Set(page.content.clone()),
            meta_description: Set(page.meta_description.clone()),
            published: Set(page.published),
            user_id: Set(page.user_id.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(model.insert(&self.conn).await?)
    }
}
