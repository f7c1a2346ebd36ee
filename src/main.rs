use clap::Parser;

mod app;
mod auth;
mod cli;
mod codes;
mod config;
mod error;
mod shares;
mod state;

use crate::cli::Cli;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "codestash=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let args = Cli::parse();

    let app_state = AppState::init().await?;
    sqlx::migrate!("./migrations").run(&app_state.db).await?;

    match args.command {
        Some(command) => cli::run(command, &app_state.db).await,
        None => {
            let app = app::build_app(app_state);
            app::serve(app).await
        }
    }
}
