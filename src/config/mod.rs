use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables (and `.env`, if present) with defaults
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {}", e);
            }
        }
        Self::from_env()
    }

    fn from_env() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/device_types.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            max_upload_bytes: get_env("MAX_UPLOAD_BYTES", "1048576")
                .parse()
                .unwrap_or(1024 * 1024),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
