use serde::Serialize;

use crate::entities::{pages, posts};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostDto {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: String,
    pub image: String,
    pub author: String,
    pub author_image: String,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<posts::Model> for PostDto {
    fn from(post: posts::Model) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            category: post.category,
            tags: post.tags,
            image: post.image,
            author: post.author,
            author_image: post.author_image,
            published: post.published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageDto {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub meta_description: String,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<pages::Model> for PageDto {
    fn from(page: pages::Model) -> Self {
        Self {
            id: page.id,
            title: page.title,
            slug: page.slug,
            content: page.content,
            meta_description: page.meta_description,
            published: page.published,
            created_at: page.created_at,
            updated_at: page.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsDto {
    pub total_posts: u64,
    pub published_posts: u64,
    pub total_views: u64,
    pub unique_visitors: u64,
}
