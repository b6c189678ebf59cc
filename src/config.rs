use std::env;
use std::net::SocketAddr;

use crate::db::DbConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DbConfig,
    pub bind_addr: SocketAddr,
    pub secure_cookies: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| "DATABASE_URL must be set".to_string())?;

        let mut database = DbConfig::new(database_url);
        if let Ok(max) = env::var("DB_MAX_CONNECTIONS") {
            database.max_connections = max
                .parse()
                .map_err(|_| format!("DB_MAX_CONNECTIONS must be a number, got {max:?}"))?;
        }

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|e| format!("Invalid BIND_ADDR: {e}"))?;

        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            database,
            bind_addr,
            secure_cookies,
        })
    }
}
