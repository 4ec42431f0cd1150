//! Storage capability for QR sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::qr::{NewQrSession, QrSession};

/// Persistence seam for the issuer and resolver.
///
/// Implementations are the only synchronization point between concurrent
/// requests; the service itself keeps no state.
#[async_trait]
pub trait QrSessionStore: Send + Sync {
    /// Persist a new session with `is_active = true` and return it with its id.
    ///
    /// When `deactivate_previous` is set, every existing row is marked inactive
    /// first, atomically with the insert where the backend allows it.
    async fn insert(
        &self,
        session: NewQrSession,
        deactivate_previous: bool,
    ) -> Result<QrSession, StoreError>;

    /// Most recent active session by `generated_at`, ties broken by highest id.
    ///
    /// With `unexpired_at = Some(now)`, rows whose `expires_at` is before `now`
    /// are skipped.
    async fn latest_active(
        &self,
        unexpired_at: Option<DateTime<Utc>>,
    ) -> Result<Option<QrSession>, StoreError>;
}

/// In-process store, used by tests and by tooling that has no database.
#[derive(Debug, Default)]
pub struct MemoryQrSessionStore {
    rows: RwLock<Vec<QrSession>>,
}

impl MemoryQrSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored row in insertion order.
    pub async fn all(&self) -> Vec<QrSession> {
        self.rows.read().await.clone()
    }
}

#[async_trait]
impl QrSessionStore for MemoryQrSessionStore {
    async fn insert(
        &self,
        session: NewQrSession,
        deactivate_previous: bool,
    ) -> Result<QrSession, StoreError> {
        let mut rows = self.rows.write().await;

        if deactivate_previous {
            for row in rows.iter_mut() {
                row.is_active = false;
            }
        }

        let id = rows.last().map_or(1, |row| row.id + 1);
        let stored = session.into_session(id);
        rows.push(stored.clone());

        Ok(stored)
    }

    async fn latest_active(
        &self,
        unexpired_at: Option<DateTime<Utc>>,
    ) -> Result<Option<QrSession>, StoreError> {
        let rows = self.rows.read().await;

        Ok(rows
            .iter()
            .filter(|row| row.is_active)
            .filter(|row| unexpired_at.map_or(true, |now| !row.is_expired_at(now)))
            .max_by_key(|row| (row.generated_at, row.id))
            .cloned())
    }
}
