use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 5,
        }
    }
}

/// Process-wide database handle.
///
/// The pool is opened on the first `connect()` and reused afterwards. Callers
/// racing the first connection all wait on the same attempt; a failed attempt
/// is not remembered, so the next caller tries again.
#[derive(Clone)]
pub struct Database {
    config: Arc<DbConfig>,
    pool: Arc<OnceCell<SqlitePool>>,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config: Arc::new(config),
            pool: Arc::new(OnceCell::new()),
        }
    }

    pub async fn connect(&self) -> Result<&SqlitePool, sqlx::Error> {
        self.pool
            .get_or_try_init(|| init_pool(&self.config))
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}

async fn init_pool(config: &DbConfig) -> Result<SqlitePool, sqlx::Error> {
    // Ensure data directory exists
    if let Some(path) = config.url.strip_prefix("sqlite:") {
        if !path.starts_with(":memory:") {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).ok();
            }
        }
    }

    let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

    tracing::info!(url = %config.url, "database pool ready");
    Ok(pool)
}
