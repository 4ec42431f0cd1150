pub mod app_state;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod models;
pub mod server;
pub mod store;
