use anyhow::{bail, Context, Result};
use std::str::FromStr;

use super::logging::LogFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown STORAGE_BACKEND '{}', expected 'postgres' or 'memory'", other),
        }
    }
}

/// Process configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub http_host: String,
    pub http_port: u16,
    /// Mount point for every route, e.g. `/blog`. Empty mounts at the root.
    pub base_path: String,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is postgres");
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .parse()
                .with_context(|| format!("invalid DATABASE_MAX_CONNECTIONS '{}'", value))?,
            None => 5,
        };

        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;

        let http_host = lookup("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let http_port = match lookup("HTTP_PORT") {
            Some(value) => value
                .parse()
                .with_context(|| format!("invalid HTTP_PORT '{}'", value))?,
            None => 3000,
        };

        let base_path = normalize_base_path(&lookup("BASE_PATH").unwrap_or_default());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8000,http://127.0.0.1:8000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            storage,
            database_url,
            database_max_connections,
            jwt_secret,
            http_host,
            http_port,
            base_path,
            cors_allowed_origins,
            log_format,
        })
    }

    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

/// `blog/`, `/blog` and `/blog/` all become `/blog`; `/` becomes empty.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_no_database_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.http_addr(), "0.0.0.0:3000");
        assert_eq!(config.base_path, "");
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn postgres_backend_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[("JWT_SECRET", "secret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn rejects_bad_port_and_unknown_backend() {
        assert!(Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("JWT_SECRET", "secret"),
            ("HTTP_PORT", "not-a-port"),
        ]))
        .is_err());

        assert!(Config::from_lookup(lookup_from(&[
            ("STORAGE_BACKEND", "sqlite"),
            ("JWT_SECRET", "secret"),
        ]))
        .is_err());
    }

    #[test]
    #[serial_test::serial]
    fn reads_process_environment() {
        std::env::set_var("STORAGE_BACKEND", "memory");
        std::env::set_var("JWT_SECRET", "from-env");
        std::env::set_var("BASE_PATH", "/blog/");

        let config = Config::from_env();

        std::env::remove_var("STORAGE_BACKEND");
        std::env::remove_var("JWT_SECRET");
        std::env::remove_var("BASE_PATH");

        let config = config.unwrap();
        assert_eq!(config.jwt_secret, "from-env");
        assert_eq!(config.base_path, "/blog");
    }

    #[test]
    fn base_path_is_normalized() {
        assert_eq!(normalize_base_path(""), "");
        assert_eq!(normalize_base_path("/"), "");
        assert_eq!(normalize_base_path("blog"), "/blog");
        assert_eq!(normalize_base_path("/blog/"), "/blog");
    }
}
