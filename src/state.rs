use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::mailer::{self, Mailer};
use crate::reset::repo::{PgResetRepo, ResetRepo};
use crate::tasks::repo::{PgTaskRepo, TaskRepo};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub tasks: Arc<dyn TaskRepo>,
    pub resets: Arc<dyn ResetRepo>,
    pub mailer: Arc<dyn Mailer>,
    pub clock: Arc<dyn Clock>,
}

/// Opens the Postgres pool.
pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let db = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    Ok(db)
}

impl AppState {
    /// Postgres-backed stores, SMTP (or log) mailer and the system clock.
    pub fn init(config: AppConfig, db: PgPool) -> anyhow::Result<Self> {
        let mailer = mailer::from_config(&config.smtp)?;
        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(PgUserRepo::new(db.clone())),
            tasks: Arc::new(PgTaskRepo::new(db.clone())),
            resets: Arc::new(PgResetRepo::new(db)),
            mailer,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserRepo>,
        tasks: Arc<dyn TaskRepo>,
        resets: Arc<dyn ResetRepo>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            users,
            tasks,
            resets,
            mailer,
            clock,
        }
    }
}
