//! Attendance QR session lifecycle.
//!
//! A session is issued on demand by an administrator and later resolved by
//! scanning clients. Issuing writes one row; resolving reads the most recent
//! row still flagged active. Expiry is derived from `expires_at` and is only
//! enforced when [`SessionPolicy::require_unexpired`] is set.

use std::sync::Arc;

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QrError;
use crate::store::QrSessionStore;

/// Lifetime of an issued session in seconds. Not configurable per call.
pub const SESSION_WINDOW_SECS: i64 = 10 * 60;

/// Default QR renderer; the encoded session type is appended as `data`.
pub const DEFAULT_QR_RENDER_BASE: &str =
    "https://api.qrserver.com/v1/create-qr-code/?size=150x150&data=";

pub fn session_window() -> Duration {
    Duration::seconds(SESSION_WINDOW_SECS)
}

/// Build the scannable code for a session type.
pub fn qr_code_url(render_base: &str, session_type: &str) -> String {
    format!("{}{}", render_base, urlencoding::encode(session_type))
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(0).unwrap_or(at)
}

/// Where a session should be considered valid. Stored, never enforced here.
///
/// Each field is independently optional.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geofence {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<f64>,
}

impl Geofence {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.radius.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueRequest {
    pub session_type: String,
    pub location: Option<Geofence>,
}

/// A session ready to be persisted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQrSession {
    pub session_type: String,
    pub code: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub geofence: Option<Geofence>,
}

impl NewQrSession {
    pub fn into_session(self, id: i64) -> QrSession {
        QrSession {
            id,
            session_type: self.session_type,
            code: self.code,
            generated_at: self.generated_at,
            expires_at: self.expires_at,
            geofence: self.geofence,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrSession {
    pub id: i64,
    pub session_type: String,
    pub code: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub geofence: Option<Geofence>,
    pub is_active: bool,
}

impl QrSession {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

/// Switches for the two lifecycle rules the stored data does not enforce.
///
/// Both default to off, which keeps older sessions flagged active and lets an
/// expired session still resolve until a newer one is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Clear `is_active` on every existing session before inserting a new one.
    pub deactivate_previous: bool,

    /// Only resolve sessions whose `expires_at` has not passed.
    pub require_unexpired: bool,
}

/// Issuer and resolver over an injected [`QrSessionStore`].
#[derive(Clone)]
pub struct QrSessionService {
    store: Arc<dyn QrSessionStore>,
    policy: SessionPolicy,
    render_base: String,
}

impl QrSessionService {
    pub fn new(store: Arc<dyn QrSessionStore>) -> Self {
        Self {
            store,
            policy: SessionPolicy::default(),
            render_base: DEFAULT_QR_RENDER_BASE.to_string(),
        }
    }

    pub fn with_policy(mut self, policy: SessionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_render_base(mut self, render_base: impl Into<String>) -> Self {
        self.render_base = render_base.into();
        self
    }

    pub async fn issue(&self, request: IssueRequest) -> Result<QrSession, QrError> {
        self.issue_at(request, Utc::now()).await
    }

    /// Issue a session as if the current time were `now`.
    pub async fn issue_at(
        &self,
        request: IssueRequest,
        now: DateTime<Utc>,
    ) -> Result<QrSession, QrError> {
        if request.session_type.trim().is_empty() {
            return Err(QrError::MissingSessionType);
        }

        let generated_at = truncate_to_seconds(now);
        let new_session = NewQrSession {
            code: qr_code_url(&self.render_base, &request.session_type),
            session_type: request.session_type,
            generated_at,
            expires_at: generated_at + session_window(),
            geofence: request.location.filter(|g| !g.is_empty()),
        };

        let session = self
            .store
            .insert(new_session, self.policy.deactivate_previous)
            .await?;

        log::info!(
            "Issued QR session id={} type={} expires_at={}",
            session.id,
            session.session_type,
            session.expires_at
        );

        Ok(session)
    }

    pub async fn active(&self) -> Result<Option<QrSession>, QrError> {
        self.active_at(Utc::now()).await
    }

    /// Resolve the active session as seen at `now`.
    ///
    /// `now` only matters when the policy requires unexpired sessions.
    pub async fn active_at(&self, now: DateTime<Utc>) -> Result<Option<QrSession>, QrError> {
        let cutoff = self
            .policy
            .require_unexpired
            .then(|| truncate_to_seconds(now));
        Ok(self.store.latest_active(cutoff).await?)
    }
}
