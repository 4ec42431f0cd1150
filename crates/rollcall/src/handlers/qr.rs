use actix_web::{web, HttpResponse, Responder};
use rollcall_core::{IssueRequest, QrError};

use crate::{
    app_state::AppState,
    models::{ErrorResponse, GenerateQrPayload, QrSessionResponse},
};

fn qr_error_response(e: QrError) -> HttpResponse {
    if e.is_client_error() {
        log::warn!("Rejected QR request: {}", e);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "missing_session_type".to_string(),
            message: e.to_string(),
        });
    }

    log::error!("QR session storage error: {}", e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: "storage_error".to_string(),
        message: e.to_string(),
    })
}

/// POST /api/v1/qr/generate
/// Issue a new attendance session valid for ten minutes
pub async fn generate(
    app_state: web::Data<AppState>,
    payload: web::Json<GenerateQrPayload>,
) -> impl Responder {
    let payload = payload.into_inner();

    let request = IssueRequest {
        session_type: payload.session_type.unwrap_or_default(),
        location: payload.location,
    };

    match app_state.qr_sessions.issue(request).await {
        Ok(session) => HttpResponse::Ok().json(QrSessionResponse::from(session)),
        Err(e) => qr_error_response(e),
    }
}

/// GET /api/v1/qr/active
/// Most recently issued session still flagged active, or `null`
pub async fn active(app_state: web::Data<AppState>) -> impl Responder {
    match app_state.qr_sessions.active().await {
        Ok(session) => HttpResponse::Ok().json(session.map(QrSessionResponse::from)),
        Err(e) => qr_error_response(e),
    }
}
