use std::net::SocketAddr;

use anyhow::Context;

/// Environment-derived configuration, read once at startup. The JWT secret
/// and expiry stay in the environment and are read where tokens are issued.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .context("PORT must be a number")?;
        let database_url =
            std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        Ok(Config {
            host,
            port,
            database_url,
        })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("HOST/PORT do not form a valid socket address")
    }
}
