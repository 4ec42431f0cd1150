pub mod account;
pub mod qr;

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse, Responder};
use sea_orm::ConnectionTrait;

use crate::{
    app_state::AppState,
    models::{DbStatusResponse, ErrorResponse},
};

/// GET /
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("API WORKING")
}

/// GET /test-db
/// Round-trips to the database and reports which backend answered
pub async fn test_db(app_state: web::Data<AppState>) -> impl Responder {
    match app_state.db.ping().await {
        Ok(()) => HttpResponse::Ok().json(DbStatusResponse {
            message: "DB Connected!".to_string(),
            database: format!("{:?}", app_state.db.get_database_backend()),
        }),
        Err(e) => {
            log::error!("Database ping failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "storage_error".to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Turns body extraction failures into the JSON error shape used everywhere else.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::warn!("Rejected request body: {}", err);
    let response = HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_body".to_string(),
        message: err.to_string(),
    });
    actix_web::error::InternalError::from_response(err, response).into()
}
