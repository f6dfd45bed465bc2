use sea_orm::entity::prelude::*;

/// Server-side bearer-token store. Rows carry a TTL so token state survives
/// restarts and works across instances; expired rows are ignored on
/// verification and purged opportunistically.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auth_tokens")]
pub struct Model {
    /// Random 64-char hex token
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    pub user_id: String,

    pub created_at: String,

    pub expires_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
