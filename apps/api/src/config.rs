use anyhow::{bail, Context, Result};

pub const DEFAULT_AVATAR_FALLBACK: &str = "https://via.placeholder.com/80?text=Avatar";

/// Which store the service binds to at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: BackendKind,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub avatar_fallback_url: String,
    pub avatar_probe_timeout_ms: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let backend = match std::env::var("BACKEND").as_deref() {
            Ok("memory") => BackendKind::Memory,
            Ok("postgres") | Err(_) => BackendKind::Postgres,
            Ok(other) => bail!("BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let database_url = match backend {
            BackendKind::Postgres => Some(require_env("DATABASE_URL")?),
            BackendKind::Memory => std::env::var("DATABASE_URL").ok(),
        };

        Ok(Config {
            backend,
            database_url,
            run_migrations: std::env::var("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            supabase_url: require_env("SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            supabase_jwt_secret: require_env("SUPABASE_JWT_SECRET")?,
            avatar_fallback_url: std::env::var("AVATAR_FALLBACK_URL")
                .unwrap_or_else(|_| DEFAULT_AVATAR_FALLBACK.to_string()),
            avatar_probe_timeout_ms: std::env::var("AVATAR_PROBE_TIMEOUT_MS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u64>()
                .context("AVATAR_PROBE_TIMEOUT_MS must be a number of milliseconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
impl Config {
    /// Config for in-process tests; never touches the environment.
    pub fn for_tests() -> Self {
        Config {
            backend: BackendKind::Memory,
            database_url: None,
            run_migrations: false,
            supabase_url: "http://127.0.0.1:1".to_string(),
            supabase_anon_key: "anon-test-key".to_string(),
            supabase_jwt_secret: "test-jwt-secret".to_string(),
            avatar_fallback_url: DEFAULT_AVATAR_FALLBACK.to_string(),
            avatar_probe_timeout_ms: 500,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
