use crate::config::AppConfig;
use crate::students::repo::{MemoryStudentStore, PgStudentStore, StudentStore};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn StudentStore>,
}

impl AppState {
    /// Connects the configured store. Also returns the pool so `main` can migrate it.
    pub async fn init() -> anyhow::Result<(Self, Option<PgPool>)> {
        let config = Arc::new(AppConfig::from_env()?);

        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set; using in-memory store");
            let store = Arc::new(MemoryStudentStore::new()) as Arc<dyn StudentStore>;
            return Ok((Self::from_parts(config, store), None));
        };

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(url)
            .await
            .context("connect to database")?;

        let store = Arc::new(PgStudentStore::new(db.clone())) as Arc<dyn StudentStore>;
        Ok((Self::from_parts(config, store), Some(db)))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn StudentStore>) -> Self {
        Self { config, store }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::from_parts(
            Arc::new(AppConfig::default()),
            Arc::new(MemoryStudentStore::new()),
        )
    }
}
