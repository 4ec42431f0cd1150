use crate::{app_state::AppState, config::ServeConfig, handlers, store::SeaOrmQrSessionStore};
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use migration::MigratorTrait;
use rollcall_core::QrSessionService;
use sea_orm::Database;
use std::sync::Arc;

/// Registers every route. Shared by the server and the HTTP tests.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(handlers::json_error_handler))
        .route("/", web::get().to(handlers::index))
        .route("/test-db", web::get().to(handlers::test_db))
        .service(
            web::scope("/api/v1")
                .route("/register", web::post().to(handlers::account::register))
                .route("/login", web::post().to(handlers::account::login))
                .route("/qr/generate", web::post().to(handlers::qr::generate))
                .route("/qr/active", web::get().to(handlers::qr::active)),
        );
}

fn build_cors(config: &ServeConfig) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600);

    if config.cors_allows_any() {
        return cors.allow_any_origin();
    }

    config
        .cors_origin_list()
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

pub async fn run_server(config: ServeConfig) -> anyhow::Result<()> {
    log::info!("Starting Rollcall API Server...");

    // 1. Connect to database
    log::info!("Connecting to database: {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;

    // Run migrations
    log::info!("Running database migrations...");
    migration::Migrator::up(&db, None).await?;
    log::info!("Database migrations completed");

    // 2. QR session service over the database-backed store
    let policy = config.session.policy();
    let qr_sessions = QrSessionService::new(Arc::new(SeaOrmQrSessionStore::new(db.clone())))
        .with_policy(policy)
        .with_render_base(config.session.qr_render_base.clone());
    log::info!(
        "QR sessions: deactivate_previous={} require_unexpired={}",
        policy.deactivate_previous,
        policy.require_unexpired
    );

    if config.admin_passkey.is_none() {
        log::warn!("ADMIN_PASSKEY is not set; admin registration is open");
    }

    // 3. Create AppState
    let app_state = web::Data::new(AppState {
        db,
        qr_sessions,
        admin_passkey: config.admin_passkey.clone(),
    });

    // 4. Start HTTP server
    let bind_address = config.bind_address.clone();
    log::info!("Listening on http://{}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .wrap(build_cors(&config))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionArgs;

    fn serve_config(cors_origins: &str) -> ServeConfig {
        ServeConfig {
            database_url: "sqlite::memory:".to_string(),
            bind_address: "127.0.0.1:5000".to_string(),
            cors_origins: cors_origins.to_string(),
            log_level: "info".to_string(),
            admin_passkey: None,
            session: SessionArgs::default(),
        }
    }

    #[test]
    fn test_cors_origin_parsing() {
        let config = serve_config("http://localhost:3000, http://example.com,");

        let origins = config.cors_origin_list();
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "http://localhost:3000");
        assert_eq!(origins[1], "http://example.com");
        assert!(!config.cors_allows_any());
    }

    #[test]
    fn test_cors_wildcard() {
        assert!(serve_config("*").cors_allows_any());
    }
}
