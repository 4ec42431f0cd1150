use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One issued attendance QR session.
///
/// Rows are only ever inserted, apart from the optional bulk deactivation that
/// runs before an insert when the server is configured for it.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "qr_codes_admin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = true)]
    pub id: i64,

    pub session_type: String,

    /// Render URL embedding the encoded session type.
    pub code: String,

    /// Unix timestamp (seconds).
    pub generated_at: i64,

    /// Unix timestamp (seconds). Always `generated_at + 600`.
    pub expires_at: i64,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    pub radius: Option<f64>,

    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
