//! Server settings read from the environment

use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";
pub const DEV_SESSION_SECRET: &str = "dev-session-secret-change-me";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub session_secret: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen = lookup("FIXIT_LISTEN_ADDR")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen
            .trim()
            .parse()
            .with_context(|| format!("FIXIT_LISTEN_ADDR is not a socket address: {}", listen))?;

        let session_secret = match lookup("FIXIT_SESSION_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("FIXIT_SESSION_SECRET not set, using the development secret");
                DEV_SESSION_SECRET.to_string()
            }
        };

        Ok(Self {
            listen_addr,
            session_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.listen_addr.port(), 8081);
        assert_eq!(config.session_secret, DEV_SESSION_SECRET);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(|name| match name {
            "FIXIT_LISTEN_ADDR" => Some("127.0.0.1:9000".to_string()),
            "FIXIT_SESSION_SECRET" => Some("s3cret".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.session_secret, "s3cret");
    }

    #[test]
    fn test_bad_listen_addr() {
        let result = ServerConfig::from_lookup(|name| {
            (name == "FIXIT_LISTEN_ADDR").then(|| "port nine".to_string())
        });
        assert!(result.is_err());
    }
}
