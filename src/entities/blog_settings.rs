use sea_orm::entity::prelude::*;

/// Singleton table: at most one row is ever read or written.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blog_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Serialized blog-settings document (JSON)
    #[sea_orm(column_type = "Text")]
    pub data: String,

    pub user_id: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
