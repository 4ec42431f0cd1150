use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,

    pub name: String,

    /// Always stored lower-cased so lookups are case-insensitive.
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id PHC string.
    pub password: String,

    /// "admin" or "student".
    pub role: String,

    pub roll_no: Option<String>,

    pub department: Option<String>,

    pub year: Option<String>,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
