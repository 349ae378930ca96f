//! Server configuration read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `DATABASE_URL` | `sqlite://<data dir>/Chore Tracker/chores.db` |
//! | `HTTP_ADDR` | `127.0.0.1:3000` |
//! | `CORS_ORIGIN` | `http://localhost:8080` |
//! | `DAY_BOUNDARY_OFFSET_MINUTES` | `0` (UTC days) |
//! | `DB_MAX_CONNECTIONS` | `5` |

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::backend::domain::calendar::DayBoundary;

const APP_DIR_NAME: &str = "Chore Tracker";
const DATABASE_FILE_NAME: &str = "chores.db";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Directory to create before connecting; set only when the default database location is used
    pub data_dir: Option<PathBuf>,
    pub http_addr: SocketAddr,
    pub cors_origin: String,
    pub day_boundary: DayBoundary,
    pub db_max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (database_url, data_dir) = match lookup("DATABASE_URL") {
            Some(url) => (url, None),
            None => {
                let dir = default_data_dir();
                let url = format!("sqlite://{}", dir.join(DATABASE_FILE_NAME).display());
                (url, Some(dir))
            }
        };

        let http_addr = parse_or(&lookup, "HTTP_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let cors_origin = lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:8080".to_string());
        let offset_minutes: i32 = parse_or(&lookup, "DAY_BOUNDARY_OFFSET_MINUTES", 0)?;
        let day_boundary = DayBoundary::from_offset_minutes(offset_minutes)
            .context("DAY_BOUNDARY_OFFSET_MINUTES is out of range")?;
        let db_max_connections: u32 = parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?;

        Ok(Self {
            database_url,
            data_dir,
            http_addr,
            cors_origin,
            day_boundary,
            db_max_connections,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.database_url.starts_with("sqlite://"));
        assert!(config.database_url.ends_with("chores.db"));
        assert!(config.data_dir.is_some());
        assert_eq!(config.http_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(config.cors_origin, "http://localhost:8080");
        assert_eq!(config.day_boundary.offset_minutes(), 0);
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite://test.db"),
            ("HTTP_ADDR", "0.0.0.0:8000"),
            ("DAY_BOUNDARY_OFFSET_MINUTES", "-300"),
            ("DB_MAX_CONNECTIONS", "2"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite://test.db");
        assert!(config.data_dir.is_none());
        assert_eq!(config.http_addr.port(), 8000);
        assert_eq!(config.day_boundary.offset_minutes(), -300);
        assert_eq!(config.db_max_connections, 2);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = config_from(&[("HTTP_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_ADDR"));

        let err = config_from(&[("DAY_BOUNDARY_OFFSET_MINUTES", "5000")]).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
