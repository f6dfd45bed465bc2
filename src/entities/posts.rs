use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub category: String,

    /// Free-text CSV, e.g. "media,tech"
    pub tags: String,

    /// Public URL of the header image
    pub image: String,

    pub author: String,

    pub author_image: String,

    pub published: bool,

    /// Owner user id. Intentionally not a foreign key, matching the
    /// lazily-provisioned user lifecycle.
    pub user_id: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
