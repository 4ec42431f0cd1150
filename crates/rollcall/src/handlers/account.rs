use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use entity::user as user_entity;
use rollcall_core::account::{self, AccountError, Registration, Role};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::{
    app_state::AppState,
    models::{ErrorResponse, LoginPayload, RegisterPayload, UserInfo, UserResponse},
};

fn account_error(e: AccountError) -> HttpResponse {
    let code = match e {
        AccountError::MissingFields => "missing_fields",
        AccountError::InvalidEmail => "invalid_email",
        AccountError::InvalidRole => "invalid_role",
        AccountError::Hashing(_) | AccountError::CorruptCredentials(_) => {
            log::error!("Credential processing failed: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal_error".to_string(),
                message: e.to_string(),
            });
        }
    };

    log::warn!("Rejected account request: {}", e);
    HttpResponse::BadRequest().json(ErrorResponse {
        error: code.to_string(),
        message: e.to_string(),
    })
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorResponse {
        error: "unauthorized".to_string(),
        message: "Invalid email or password".to_string(),
    })
}

fn storage_error(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "storage_error".to_string(),
        message: e.to_string(),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/v1/register
/// Create a new account
pub async fn register(
    app_state: web::Data<AppState>,
    payload: web::Json<RegisterPayload>,
) -> impl Responder {
    let payload = payload.into_inner();

    // 1. Required fields, email format, role
    let registration = match Registration::parse(
        &payload.name,
        &payload.email,
        &payload.password,
        &payload.role,
    ) {
        Ok(registration) => registration,
        Err(e) => return account_error(e),
    };

    log::info!("Registration attempt for: {}", registration.email);

    // 2. Admin accounts need the passkey when one is configured
    if registration.role == Role::Admin {
        if let Some(expected) = app_state.admin_passkey.as_deref() {
            if payload.admin_passkey.as_deref() != Some(expected) {
                log::warn!(
                    "Admin registration rejected for {}: bad passkey",
                    registration.email
                );
                return HttpResponse::Forbidden().json(ErrorResponse {
                    error: "invalid_passkey".to_string(),
                    message: "Admin passkey is incorrect".to_string(),
                });
            }
        }
    }

    // 3. Check if email exists
    match user_entity::Entity::find()
        .filter(user_entity::Column::Email.eq(&registration.email))
        .one(&app_state.db)
        .await
    {
        Ok(Some(_)) => {
            log::warn!(
                "Registration failed: email already exists: {}",
                registration.email
            );
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "email_taken".to_string(),
                message: "Email already exists".to_string(),
            });
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Database error during registration check: {}", e);
            return storage_error(e);
        }
    }

    // 4. Seal password
    let sealed = match account::seal_password(&payload.password) {
        Ok(sealed) => sealed,
        Err(e) => return account_error(e),
    };

    // 5. Insert user
    let new_user = user_entity::ActiveModel {
        name: Set(registration.name),
        email: Set(registration.email),
        password: Set(sealed),
        role: Set(registration.role.as_str().to_string()),
        roll_no: Set(non_blank(payload.roll_no)),
        department: Set(non_blank(payload.department)),
        year: Set(non_blank(payload.year)),
        created_at: Set(Utc::now().timestamp()),
        ..Default::default()
    };

    match new_user.insert(&app_state.db).await {
        Ok(user) => {
            log::info!("User registered: {} (ID: {})", user.email, user.id);
            HttpResponse::Created().json(UserResponse {
                user: UserInfo::from(user),
            })
        }
        Err(e) => {
            log::error!("Failed to insert user: {}", e);
            storage_error(e)
        }
    }
}

/// POST /api/v1/login
/// Check credentials and return the user record
pub async fn login(
    app_state: web::Data<AppState>,
    payload: web::Json<LoginPayload>,
) -> impl Responder {
    let email = account::normalize_email(&payload.email);

    if email.is_empty() || payload.password.is_empty() {
        return account_error(AccountError::MissingFields);
    }

    log::info!("Login attempt for: {}", email);

    let user = match user_entity::Entity::find()
        .filter(user_entity::Column::Email.eq(&email))
        .one(&app_state.db)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            log::warn!("Login failed, unknown email: {}", email);
            return invalid_credentials();
        }
        Err(e) => {
            log::error!("Database error (user lookup): {}", e);
            return storage_error(e);
        }
    };

    match account::password_matches(&payload.password, &user.password) {
        Ok(true) => {}
        Ok(false) => {
            log::warn!("Invalid password for: {}", email);
            return invalid_credentials();
        }
        Err(e) => {
            log::error!("Unreadable credentials for user_id={}", user.id);
            return account_error(e);
        }
    }

    log::info!("Login successful for: {}", email);

    HttpResponse::Ok().json(UserResponse {
        user: UserInfo::from(user),
    })
}
