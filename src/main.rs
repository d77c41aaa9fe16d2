mod ai_sdk;
mod catalog;
mod client;
mod commands;
mod config;
mod controller;
mod error;
mod media;
mod session;
mod ui;

use clap::Parser;
use client::ApiClient;
use config::Config;
use controller::SessionController;
use session::Session;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let config = Config::parse();

    // stdout belongs to the TUI, so logs go to a file.
    let log_file = std::fs::File::create(&config.log_file)?;
    let filter = EnvFilter::try_from_env("KEYCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    let session = Session::new(config.system.clone(), config.parameters());
    let mut controller = SessionController::new(ApiClient::new(), session)
        .with_default_chat_model(config.default_model.clone());
    controller.set_credentials(config.credentials());
    tracing::info!(base_url = %config.base_url, "starting keychat");

    ui::run_tui(controller)
}
