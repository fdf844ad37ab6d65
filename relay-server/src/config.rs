//! Server configuration, loaded from environment variables at startup.

use std::time::Duration;

/// Instruction sent as the system message when `RELAY_INSTRUCTIONS` is unset.
///
/// The model tends to answer in the language of this text. Deployments that
/// serve Arabic-speaking users, or need a specific assistant persona, should
/// set `RELAY_INSTRUCTIONS` to their own instruction rather than rely on this
/// English default.
pub const DEFAULT_INSTRUCTIONS: &str = "You are the employee-services assistant. \
Answer questions about internal services using only the information you have been given. \
If the answer is not in that information, say that you could not find it there. \
Do not answer questions outside that information.";

/// Runtime configuration for relay-server.
///
/// Every field except the provider key has a default so the server starts
/// without any environment variables set.
#[derive(Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8100"`, port from `PORT`).
    pub bind_address: String,

    /// sqlx SQLite URL (default: `"sqlite://relay.db"`).
    pub database_url: String,

    /// Upper bound on pooled database connections.
    pub database_max_connections: u32,

    /// Scoring endpoint of the inference provider.
    pub provider_endpoint: String,

    /// Bearer credential for the provider. Never logged.
    pub provider_api_key: Option<String>,

    /// Whole-request timeout for provider calls; `None` keeps the transport default.
    pub provider_timeout: Option<Duration>,

    pub temperature: f32,
    pub max_tokens: u32,

    /// System instruction prepended to every question.
    pub instructions: String,

    /// Comma-separated allowed CORS origins; `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve the OpenAPI document at `/api-docs/openapi.json`.
    pub enable_openapi: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bind_address", &self.bind_address)
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("provider_endpoint", &self.provider_endpoint)
            .field(
                "provider_api_key",
                &self.provider_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("provider_timeout", &self.provider_timeout)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("instructions_len", &self.instructions.len())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("enable_openapi", &self.enable_openapi)
            .field("log_level", &self.log_level)
            .field("log_json", &self.log_json)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build [`Config`] from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };

        let port = lookup("PORT").unwrap_or_else(|| "8100".to_owned());
        let bind_address = lookup("RELAY_BIND").unwrap_or_else(|| format!("0.0.0.0:{port}"));

        Self {
            bind_address,
            database_url: env_or("RELAY_DATABASE_URL", "sqlite://relay.db"),
            database_max_connections: parse_or(&lookup, "RELAY_DATABASE_MAX_CONNECTIONS", 5),
            provider_endpoint: env_or("RELAY_PROVIDER_ENDPOINT", "http://127.0.0.1:8080/score"),
            provider_api_key: lookup("RELAY_PROVIDER_API_KEY").filter(|k| !k.is_empty()),
            provider_timeout: lookup("RELAY_PROVIDER_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs),
            temperature: parse_or(&lookup, "RELAY_TEMPERATURE", 0.7),
            max_tokens: parse_or(&lookup, "RELAY_MAX_TOKENS", 2000),
            instructions: env_or("RELAY_INSTRUCTIONS", DEFAULT_INSTRUCTIONS),
            cors_allowed_origins: lookup("RELAY_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            enable_openapi: flag("RELAY_ENABLE_OPENAPI", true),
            log_level: env_or("RELAY_LOG", "info"),
            log_json: flag("RELAY_LOG_JSON", false),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
