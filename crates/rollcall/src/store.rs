//! Sea-ORM implementation of [`QrSessionStore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use entity::qr_code;
use rollcall_core::qr::{Geofence, NewQrSession, QrSession};
use rollcall_core::{QrSessionStore, StoreError};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

fn backend(e: DbErr) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn timestamp(id: i64, column: &str, secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Corrupt(format!("{column}={secs} out of range on id {id}")))
}

fn row_to_session(row: qr_code::Model) -> Result<QrSession, StoreError> {
    let geofence = Geofence {
        latitude: row.latitude,
        longitude: row.longitude,
        radius: row.radius,
    };

    Ok(QrSession {
        generated_at: timestamp(row.id, "generated_at", row.generated_at)?,
        expires_at: timestamp(row.id, "expires_at", row.expires_at)?,
        id: row.id,
        session_type: row.session_type,
        code: row.code,
        geofence: (!geofence.is_empty()).then_some(geofence),
        is_active: row.is_active,
    })
}

/// Stores sessions in the `qr_codes_admin` table.
#[derive(Clone)]
pub struct SeaOrmQrSessionStore {
    db: DatabaseConnection,
}

impl SeaOrmQrSessionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QrSessionStore for SeaOrmQrSessionStore {
    async fn insert(
        &self,
        session: NewQrSession,
        deactivate_previous: bool,
    ) -> Result<QrSession, StoreError> {
        let geofence = session.geofence.unwrap_or_default();

        let txn = self.db.begin().await.map_err(backend)?;

        if deactivate_previous {
            let result = qr_code::Entity::update_many()
                .col_expr(qr_code::Column::IsActive, Expr::value(false))
                .filter(qr_code::Column::IsActive.eq(true))
                .exec(&txn)
                .await
                .map_err(backend)?;
            log::debug!("Deactivated {} previous QR sessions", result.rows_affected);
        }

        let model = qr_code::ActiveModel {
            session_type: Set(session.session_type),
            code: Set(session.code),
            generated_at: Set(session.generated_at.timestamp()),
            expires_at: Set(session.expires_at.timestamp()),
            latitude: Set(geofence.latitude),
            longitude: Set(geofence.longitude),
            radius: Set(geofence.radius),
            is_active: Set(true),
            ..Default::default()
        };

        // Dropping the transaction on error rolls it back.
        let inserted = model.insert(&txn).await.map_err(backend)?;
        txn.commit().await.map_err(backend)?;

        row_to_session(inserted)
    }

    async fn latest_active(
        &self,
        unexpired_at: Option<DateTime<Utc>>,
    ) -> Result<Option<QrSession>, StoreError> {
        let mut query = qr_code::Entity::find().filter(qr_code::Column::IsActive.eq(true));

        if let Some(now) = unexpired_at {
            query = query.filter(qr_code::Column::ExpiresAt.gte(now.timestamp()));
        }

        query
            .order_by_desc(qr_code::Column::GeneratedAt)
            .order_by_desc(qr_code::Column::Id)
            .one(&self.db)
            .await
            .map_err(backend)?
            .map(row_to_session)
            .transpose()
    }
}
