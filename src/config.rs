use std::{net::SocketAddr, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fanhub".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "fanhub-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
        };
        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8080),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS").unwrap_or(10),
            jwt,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

/// Settings for the client side: where the upstream catalogue and our own
/// backend live, and where the session is persisted between runs.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub upstream_base_url: String,
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub page_size: u32,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            upstream_base_url: std::env::var("UPSTREAM_API_URL")
                .unwrap_or_else(|_| "https://rickandmortyapi.com/api".into()),
            api_base_url: std::env::var("FANHUB_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/v1".into()),
            session_file: std::env::var("SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".fanhub/session.json")),
            page_size: env_parse("PAGE_SIZE").unwrap_or(10),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_addr_joins_host_and_port() {
        let cfg = AppConfig {
            database_url: "postgres://localhost/fanhub".into(),
            host: "127.0.0.1".into(),
            port: 9000,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_minutes: 1,
            },
        };
        assert_eq!(cfg.listen_addr().unwrap().to_string(), "127.0.0.1:9000");
    }

    #[test]
    fn listen_addr_rejects_garbage_host() {
        let cfg = AppConfig {
            database_url: String::new(),
            host: "not a host".into(),
            port: 1,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "s".into(),
                issuer: "i".into(),
                audience: "a".into(),
                ttl_minutes: 1,
            },
        };
        assert!(cfg.listen_addr().is_err());
    }
}
