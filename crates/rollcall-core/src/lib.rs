//! Domain logic for the rollcall attendance backend.

pub mod account;
pub mod error;
pub mod qr;
pub mod store;

pub use account::AccountError;
pub use error::{QrError, StoreError};
pub use qr::{Geofence, IssueRequest, QrSession, QrSessionService, SessionPolicy};
pub use store::{MemoryQrSessionStore, QrSessionStore};
