use chrono::Utc;
use clap::Parser;
use migration::MigratorTrait;
use rollcall_core::{Geofence, QrSession};
use rollcall_lib::{
    cli,
    config::{Command, Config, DEFAULT_DATABASE_URL},
    server::run_server,
};
use sea_orm::{Database, DatabaseConnection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let config = Config::parse();

    // Initialize logger based on command
    let log_level = match &config.command {
        Command::Serve(serve_config) => serve_config.log_level.as_str(),
        _ => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match config.command {
        Command::Serve(serve_config) => {
            run_server(serve_config).await?;
        }
        Command::Migrate { database_url } => {
            run_migrations(&database_url).await?;
        }
        Command::CreateUser {
            name,
            email,
            password,
            role,
        } => {
            let db = connect_from_env().await?;
            let created = cli::create_user(&db, &name, &email, &password, &role).await?;

            println!("✅ User created successfully!");
            println!("   ID: {}", created.id);
            println!("   Email: {}", created.email);
            println!("   Role: {}", created.role);
        }
        Command::ListUsers => {
            let db = connect_from_env().await?;
            print_users(&cli::list_users(&db).await?);
        }
        Command::DeleteUser { email } => {
            let db = connect_from_env().await?;
            cli::delete_user(&db, &email).await?;
            println!("✅ User '{}' deleted successfully!", email);
        }
        Command::IssueSession {
            session_type,
            latitude,
            longitude,
            radius,
            session,
        } => {
            let db = connect_from_env().await?;
            let location = Geofence {
                latitude,
                longitude,
                radius,
            };
            let issued = cli::issue_session(db, session_type, location, &session).await?;

            println!("✅ QR session issued!");
            print_session(&issued);
        }
        Command::ActiveSession { session } => {
            let db = connect_from_env().await?;
            match cli::active_session(db, &session).await? {
                Some(active) => {
                    println!("Active QR session:");
                    print_session(&active);
                }
                None => println!("No active QR session."),
            }
        }
    }

    Ok(())
}

async fn connect_from_env() -> anyhow::Result<DatabaseConnection> {
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    log::info!("Connecting to database...");
    Ok(Database::connect(&database_url).await?)
}

async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    log::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    log::info!("Running database migrations...");
    migration::Migrator::up(&db, None).await?;

    println!("✅ Database migrations completed successfully!");

    Ok(())
}

fn print_session(session: &QrSession) {
    println!("   ID: {}", session.id);
    println!("   Type: {}", session.session_type);
    println!("   Code: {}", session.code);
    println!("   Generated: {}", session.generated_at.format("%Y-%m-%d %H:%M:%S"));
    println!("   Expires: {}", session.expires_at.format("%Y-%m-%d %H:%M:%S"));
    if session.is_expired_at(Utc::now()) {
        println!("   (expired, still flagged active)");
    }
    if let Some(fence) = session.geofence {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        println!(
            "   Geofence: lat={} lon={} radius={}",
            show(fence.latitude),
            show(fence.longitude),
            show(fence.radius)
        );
    }
}

fn print_users(users: &[entity::user::Model]) {
    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!("Users:");
    println!(
        "{:<5} {:<20} {:<30} {:<8} {:<20}",
        "ID", "Name", "Email", "Role", "Created At"
    );
    println!("{}", "-".repeat(86));
    for user in users {
        let created_at = chrono::DateTime::from_timestamp(user.created_at, 0)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| user.created_at.to_string());
        println!(
            "{:<5} {:<20} {:<30} {:<8} {:<20}",
            user.id, user.name, user.email, user.role, created_at
        );
    }
}
