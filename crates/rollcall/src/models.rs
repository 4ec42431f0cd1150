use chrono::{DateTime, Utc};
use rollcall_core::qr::{Geofence, QrSession};
use serde::{Deserialize, Serialize};

/// Request payload for POST /api/v1/register
///
/// Required fields default to empty so the handler can report them together.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
    pub roll_no: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub admin_passkey: Option<String>,
}

/// Request payload for POST /api/v1/login
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Public view of a user row
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<entity::user::Model> for UserInfo {
    fn from(user: entity::user::Model) -> Self {
        let created_at = DateTime::from_timestamp(user.created_at, 0).unwrap_or_else(|| {
            log::warn!(
                "User {} has out-of-range created_at={}; reporting epoch",
                user.id,
                user.created_at
            );
            DateTime::default()
        });

        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            roll_no: user.roll_no,
            department: user.department,
            year: user.year,
            created_at,
        }
    }
}

/// Response for register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserInfo,
}

/// Request payload for POST /api/v1/qr/generate
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQrPayload {
    pub session_type: Option<String>,
    pub location: Option<Geofence>,
}

/// An issued QR session as returned by generate and active
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrSessionResponse {
    pub id: i64,
    pub code: String,
    pub session_type: String,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub location: Option<Geofence>,
    pub is_active: bool,
}

impl From<QrSession> for QrSessionResponse {
    fn from(session: QrSession) -> Self {
        Self {
            id: session.id,
            code: session.code,
            session_type: session.session_type,
            generated_at: session.generated_at,
            expires_at: session.expires_at,
            location: session.geofence,
            is_active: session.is_active,
        }
    }
}

/// Response for GET /test-db
#[derive(Debug, Serialize, Deserialize)]
pub struct DbStatusResponse {
    pub message: String,
    pub database: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
