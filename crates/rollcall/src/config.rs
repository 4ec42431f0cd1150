use clap::builder::BoolishValueParser;
use clap::{Args, Parser};
use rollcall_core::qr::{SessionPolicy, DEFAULT_QR_RENDER_BASE};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://./rollcall.db?mode=rwc";

#[derive(Debug, Clone, Parser)]
#[command(name = "rollcall")]
#[command(about = "Rollcall attendance API server", long_about = None)]
pub struct Config {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// Start the API server
    Serve(ServeConfig),

    /// Run database migrations
    Migrate {
        /// Database connection URL
        #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
    },

    /// Create a new user
    CreateUser {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address (used to log in)
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Role: admin or student
        #[arg(short, long, default_value = "student")]
        role: String,
    },

    /// List all users
    ListUsers,

    /// Delete a user
    DeleteUser {
        /// Email of the user to delete
        #[arg(short, long)]
        email: String,
    },

    /// Issue a new attendance QR session
    IssueSession {
        /// Free-text label, e.g. "Lecture1"
        #[arg(short = 't', long)]
        session_type: String,

        /// Geofence latitude
        #[arg(long, allow_hyphen_values = true)]
        latitude: Option<f64>,

        /// Geofence longitude
        #[arg(long, allow_hyphen_values = true)]
        longitude: Option<f64>,

        /// Geofence radius
        #[arg(long)]
        radius: Option<f64>,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Show the currently active attendance QR session
    ActiveSession {
        #[command(flatten)]
        session: SessionArgs,
    },
}

/// Settings for QR session issuance and resolution.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Prefix of the QR render URL; the encoded session type is appended to it
    #[arg(long, env = "QR_RENDER_BASE", default_value = DEFAULT_QR_RENDER_BASE)]
    pub qr_render_base: String,

    /// Mark every existing session inactive when a new one is issued
    #[arg(
        long,
        env = "DEACTIVATE_PREVIOUS_SESSIONS",
        value_parser = BoolishValueParser::new()
    )]
    pub deactivate_previous: bool,

    /// Ignore sessions past their expiry when resolving the active one
    #[arg(
        long,
        env = "ACTIVE_REQUIRES_UNEXPIRED",
        value_parser = BoolishValueParser::new()
    )]
    pub active_requires_unexpired: bool,
}

impl SessionArgs {
    pub fn policy(&self) -> SessionPolicy {
        SessionPolicy {
            deactivate_previous: self.deactivate_previous,
            require_unexpired: self.active_requires_unexpired,
        }
    }
}

impl Default for SessionArgs {
    fn default() -> Self {
        Self {
            qr_render_base: DEFAULT_QR_RENDER_BASE.to_string(),
            deactivate_previous: false,
            active_requires_unexpired: false,
        }
    }
}

#[derive(Debug, Clone, Parser)]
pub struct ServeConfig {
    /// Database connection URL (SQLite or MySQL)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Server bind address
    #[arg(long, env = "BIND_ADDRESS", default_value = "127.0.0.1:5000")]
    pub bind_address: String,

    /// Allowed CORS origins (comma-separated, or "*" for any)
    #[arg(
        long,
        env = "CORS_ORIGINS",
        default_value = "http://localhost:5173,http://localhost:3000"
    )]
    pub cors_origins: String,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Passkey required to register an admin account.
    /// When unset, admin registration is open.
    #[arg(long, env = "ADMIN_PASSKEY")]
    pub admin_passkey: Option<String>,

    #[command(flatten)]
    pub session: SessionArgs,
}

impl ServeConfig {
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn cors_allows_any(&self) -> bool {
        self.cors_origin_list().iter().any(|o| o == "*")
    }
}
