mod admin;
mod app;
mod auth;
mod clock;
mod config;
mod error;
mod mailer;
mod progress;
mod reset;
mod state;
mod stats;
mod tasks;
#[cfg(test)]
mod testing;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "focusup=debug,axum=info,tower_http=info,sqlx=warn".to_string());
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

    let config = AppConfig::from_env()?;
    let db = state::connect(&config).await?;

    // Run migrations if present
    if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    let app_state = AppState::init(config, db)?;
    let app = app::build_app(app_state);
    app::serve(app).await
}
