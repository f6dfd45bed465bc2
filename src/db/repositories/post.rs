use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::{posts, prelude::*};

/// Field set for creating a post. Defaults for omitted optional fields are
/// applied by the caller's deserialization layer.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub image: String,
    pub author: String,
    pub author_image: String,
    pub published: bool,
    pub user_id: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub image: Option<String>,
    pub author: Option<String>,
    pub author_image: Option<String>,
    pub published: Option<bool>,
}

pub struct PostRepository {
    conn: DatabaseConnection,
}

impl PostRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// List posts newest-first. Unpublished rows are only included when
    /// `include_unpublished` is set (authenticated callers).
    pub async fn list(&self, include_unpublished: bool) -> Result<Vec<posts::Model>> {
        let mut query = Posts::find().order_by_desc(posts::Column::CreatedAt);

        if !include_unpublished {
            query = query.filter(posts::Column::Published.eq(true));
        }

        Ok(query.all(&self.conn).await?)
    }

    pub async fn get(&self, id: i32, include_unpublished: bool) -> Result<Option<posts::Model>> {
        let post = Posts::find_by_id(id).one(&self.conn).await?;

        Ok(post.filter(|p| p.published || include_unpublished))
    }

    pub async fn create(&self, post: &NewPost) -> Result<posts::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = posts::ActiveModel {
            title: Set(post.title.clone()),
            content: Set(post.content.clone()),
            category: Set(post.category.clone()),
            tags: Set(post.tags.clone()),
            image: Set(post.image.clone()),
            author: Set(post.author.clone()),
            author_image: Set(post.author_image.clone()),
            published: Set(post.published),
            user_id: Set(post.user_id.clone()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(model.insert(&self.conn).await?)
    }

    /// Apply a partial update and refresh `updated_at`. Returns the updated
    /// row, or `None` when the id does not exist.
    pub async fn update(&self, id: i32, update: &PostUpdate) -> Result<Option<posts::Model>> {
        let Some(existing) = Posts::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: posts::ActiveModel = existing.into();

        if let Some(title) = &update.title {
            active.title = Set(title.clone());
        }
        if let Some(content) = &update.content {
            active.content = Set(content.clone());
        }
        if let Some(category) = &update.category {
            active.category = Set(category.clone());
        }
        if let Some(tags) = &update.tags {
            active.tags = Set(tags.clone());
        }
        if let Some(image) = &update.image {
            active.image = Set(image.clone());
        }
        if let Some(author) = &update.author {
            active.author = Set(author.clone());
        }
        if let Some(author_image) = &update.author_image {
            active.author_image = Set(author_image.clone());
        }
        if let Some(published) = update.published {
            active.published = Set(published);
        }

        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Posts::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn count_total(&self) -> Result<u64> {
        Ok(Posts::find().count(&self.conn).await?)
    }

    pub async fn count_published(&self) -> Result<u64> {
        Ok(Posts::find()
            .filter(posts::Column::Published.eq(true))
            .count(&self.conn)
            .await?)
    }
}
