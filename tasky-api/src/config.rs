/// Configuration management for the API server
///
/// Configuration is read once at startup into a typed [`Config`] and
/// validated before anything else starts. A local `.env` file, when present,
/// overrides the process environment.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `ASSETS_DIR`: Directory holding the HTML pages and static assets (default: ./assets)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: *)
/// - `STORAGE_BACKEND`: `postgres` or `memory` (default: postgres)
/// - `DATABASE_URL`: PostgreSQL connection string (required for postgres)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SESSION_SECRET`: Secret for signing session tokens (required, >= 32 chars)
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 24)
/// - `SECURE_COOKIES`: Mark the session cookie `Secure` (default: false)
/// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
/// - `REQUEST_TRACING`: Wrap every request in a tracing span (default: true)
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: Enables OTLP span export when set
/// - `OTEL_SERVICE_NAME`: Service name reported to the collector (default: tasky)
///
/// # Example
///
/// ```no_run
/// use tasky_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tasky_shared::db::pool::DatabaseConfig;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,

    /// The `.env` file applied by [`Config::from_env`], if any
    #[serde(skip)]
    pub env_file: Option<PathBuf>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Holds `login.html`, `todo.html` and everything served under `/assets`
    pub assets_dir: PathBuf,

    /// Allowed CORS origins; `*` means any
    pub cors_origins: Vec<String>,
}

/// Which storage backend to open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => anyhow::bail!("STORAGE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// PostgreSQL connection URL (empty for the memory backend)
    pub url: String,

    pub max_connections: u32,
}

impl StorageConfig {
    /// Pool settings for the PostgreSQL backend
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            ..Default::default()
        }
    }
}

/// Session token configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Secret key for signing session tokens
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_hours: i64,

    /// Adds `Secure` to the session cookie (enable behind HTTPS)
    pub secure_cookies: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"<redacted>")
            .field("ttl_hours", &self.ttl_hours)
            .field("secure_cookies", &self.secure_cookies)
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

/// Logging and trace export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub log_format: LogFormat,

    /// Wrap every HTTP request in a tracing span
    pub request_tracing: bool,

    /// OTLP collector endpoint; export is off when `None`
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tasky".to_string(),
            log_format: LogFormat::Pretty,
            request_tracing: true,
            otlp_endpoint: None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
    }
}

impl Config {
    /// Loads configuration from the environment
    ///
    /// A `.env` file in the working directory is applied first and overrides
    /// variables already set in the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is
    /// invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        let env_file = dotenvy::dotenv_override().ok();

        let mut config = Self::from_lookup(|key| std::env::var(key).ok())?;
        config.env_file = env_file;
        Ok(config)
    }

    /// Builds and validates configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;
        let assets_dir = PathBuf::from(get("ASSETS_DIR").unwrap_or_else(|| "./assets".to_string()));
        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let backend = match get("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Postgres,
        };
        let url = match backend {
            StorageBackend::Postgres => get("DATABASE_URL").ok_or_else(|| {
                anyhow::anyhow!("DATABASE_URL environment variable is required for the postgres backend")
            })?,
            StorageBackend::Memory => String::new(),
        };
        let max_connections = get("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;
        if max_connections == 0 {
            anyhow::bail!("DATABASE_MAX_CONNECTIONS must be greater than zero");
        }

        let secret = get("SESSION_SECRET")
            .ok_or_else(|| anyhow::anyhow!("SESSION_SECRET environment variable is required"))?;
        if secret.len() < 32 {
            anyhow::bail!("SESSION_SECRET must be at least 32 characters long");
        }
        let ttl_hours = get("SESSION_TTL_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("SESSION_TTL_HOURS is invalid: {}", e))?;
        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be greater than zero");
        }
        let secure_cookies = match get("SECURE_COOKIES") {
            Some(value) => parse_bool("SECURE_COOKIES", &value)?,
            None => false,
        };

        let defaults = TelemetryConfig::default();
        let log_format = match get("LOG_FORMAT") {
            Some(value) => value.parse::<LogFormat>()?,
            None => defaults.log_format,
        };
        let request_tracing = match get("REQUEST_TRACING") {
            Some(value) => parse_bool("REQUEST_TRACING", &value)?,
            None => defaults.request_tracing,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                assets_dir,
                cors_origins,
            },
            storage: StorageConfig {
                backend,
                url,
                max_connections,
            },
            session: SessionConfig {
                secret,
                ttl_hours,
                secure_cookies,
            },
            telemetry: TelemetryConfig {
                service_name: get("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
                log_format,
                request_tracing,
                otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
            },
            env_file: None,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Session lifetime
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session.ttl_hours)
    }
}
