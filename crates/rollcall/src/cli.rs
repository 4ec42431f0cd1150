//! Administrative commands run from the `rollcall` binary.
//!
//! Each command takes an open connection and returns what it did; printing is
//! left to `main`.

use std::sync::Arc;

use chrono::Utc;
use entity::user;
use rollcall_core::account::{self, Registration};
use rollcall_core::{Geofence, IssueRequest, QrSession, QrSessionService};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::config::SessionArgs;
use crate::store::SeaOrmQrSessionStore;

pub fn session_service(db: DatabaseConnection, args: &SessionArgs) -> QrSessionService {
    QrSessionService::new(Arc::new(SeaOrmQrSessionStore::new(db)))
        .with_policy(args.policy())
        .with_render_base(args.qr_render_base.clone())
}

pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<user::Model> {
    let registration = Registration::parse(name, email, password, role)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&registration.email))
        .one(db)
        .await?;

    if existing.is_some() {
        anyhow::bail!("User '{}' already exists", registration.email);
    }

    log::info!("Sealing password...");
    let sealed = account::seal_password(password)?;

    let new_user = user::ActiveModel {
        name: Set(registration.name),
        email: Set(registration.email),
        password: Set(sealed),
        role: Set(registration.role.as_str().to_string()),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };

    Ok(new_user.insert(db).await?)
}

pub async fn list_users(db: &DatabaseConnection) -> anyhow::Result<Vec<user::Model>> {
    Ok(user::Entity::find().all(db).await?)
}

pub async fn delete_user(db: &DatabaseConnection, email: &str) -> anyhow::Result<()> {
    let email = account::normalize_email(email);
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;

    match user {
        Some(user) => {
            user::Entity::delete_by_id(user.id).exec(db).await?;
            Ok(())
        }
        None => anyhow::bail!("User '{}' not found", email),
    }
}

pub async fn issue_session(
    db: DatabaseConnection,
    session_type: String,
    location: Geofence,
    args: &SessionArgs,
) -> anyhow::Result<QrSession> {
    let service = session_service(db, args);

    Ok(service
        .issue(IssueRequest {
            session_type,
            location: Some(location),
        })
        .await?)
}

pub async fn active_session(
    db: DatabaseConnection,
    args: &SessionArgs,
) -> anyhow::Result<Option<QrSession>> {
    Ok(session_service(db, args).active().await?)
}
