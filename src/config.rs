use serde::Deserialize;

use crate::students::dto::Profile;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service against the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub server: ServerConfig,
    /// Schema profile used for `GET /estudiantes/`.
    pub list_profile: Profile,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let server = ServerConfig {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
        };
        let list_profile = match std::env::var("LIST_PROFILE") {
            Ok(v) => v.parse::<Profile>()?,
            Err(_) => Profile::Summary,
        };
        Ok(Self {
            database_url,
            max_connections,
            server,
            list_profile,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 8000,
            },
            list_profile: Profile::Summary,
        }
    }
}
