//! Process configuration from `HABITA_*` environment variables.

use std::env;

use habita_db::DbConfig;
use habita_identity::IdentityConfig;

/// Everything the server binary needs to start, resolved once at boot.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db: DbConfig,
    pub identity: IdentityConfig,
    /// CORS allow-list. `None` allows any origin.
    pub cors_origins: Option<Vec<String>>,
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to
    /// development defaults for everything except the identity client
    /// id, which has no sensible default and stays empty.
    pub fn from_env() -> Self {
        let db = DbConfig {
            url: var_or("HABITA_DB_URL", "127.0.0.1:8000"),
            namespace: var_or("HABITA_DB_NS", "habita"),
            database: var_or("HABITA_DB_NAME", "main"),
            username: var_or("HABITA_DB_USER", "root"),
            password: var_or("HABITA_DB_PASS", "root"),
        };

        let mut identity = IdentityConfig::new(
            var_or("HABITA_IDP_REGION", "us-east-1"),
            var_or("HABITA_IDP_CLIENT_ID", ""),
        );
        identity.endpoint = env::var("HABITA_IDP_ENDPOINT").ok().filter(|v| !v.is_empty());

        let cors_origins = env::var("HABITA_CORS_ORIGINS").ok().and_then(|raw| {
            let origins: Vec<String> = raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if origins.is_empty() { None } else { Some(origins) }
        });

        Self {
            bind_addr: var_or("HABITA_BIND_ADDR", "0.0.0.0:8080"),
            db,
            identity,
            cors_origins,
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}
