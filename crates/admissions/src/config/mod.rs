use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_CURRENT_URL: &str = "http://localhost:8000/crawl";
const DEFAULT_PRIOR_URL: &str = "http://localhost:8000/crawl/prior";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sources: SourceConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let current_url = validate_url(
            "ADMISSIONS_CURRENT_URL",
            env::var("ADMISSIONS_CURRENT_URL").unwrap_or_else(|_| DEFAULT_CURRENT_URL.to_string()),
        )?;
        let prior_url = validate_url(
            "ADMISSIONS_PRIOR_URL",
            env::var("ADMISSIONS_PRIOR_URL").unwrap_or_else(|_| DEFAULT_PRIOR_URL.to_string()),
        )?;
        let timeout_secs = match env::var("ADMISSIONS_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            sources: SourceConfig {
                current_url,
                prior_url,
                timeout_secs,
            },
        })
    }
}

/// Checks that a configured endpoint is an absolute http(s) URL.
pub fn validate_url(variable: &'static str, value: String) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(value.trim()).map_err(|source| ConfigError::InvalidSourceUrl {
        variable,
        value: value.clone(),
        reason: source.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        scheme => Err(ConfigError::InvalidSourceUrl {
            variable,
            value,
            reason: format!("unsupported scheme '{scheme}'"),
        }),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Upstream statistics endpoints for both admission periods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub current_url: String,
    pub prior_url: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            current_url: DEFAULT_CURRENT_URL.to_string(),
            prior_url: DEFAULT_PRIOR_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidTimeout,
    InvalidSourceUrl {
        variable: &'static str,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "ADMISSIONS_TIMEOUT_SECS must be a positive integer")
            }
            ConfigError::InvalidSourceUrl {
                variable,
                value,
                reason,
            } => write!(f, "{variable} '{value}' is not a usable http(s) URL: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidSourceUrl { .. } => None,
        }
    }
}
