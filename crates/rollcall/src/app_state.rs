use rollcall_core::QrSessionService;
use sea_orm::DatabaseConnection;

/// Shared application state
pub struct AppState {
    /// Sea-ORM database connection pool
    pub db: DatabaseConnection,

    /// QR session issuer/resolver, backed by its own injected store
    pub qr_sessions: QrSessionService,

    /// Passkey required for admin registration, if configured
    pub admin_passkey: Option<String>,
}
