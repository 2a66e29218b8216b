use chrono::Datelike;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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

/// Top-level configuration for the ranking service and command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ranking: RankingConfig,
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

        let log_level = env::var("RANK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let shortlist_size = match env::var("RANK_SHORTLIST_SIZE") {
            Ok(raw) => parse_shortlist_size(&raw)?,
            Err(_) => DEFAULT_SHORTLIST_SIZE,
        };

        let reference_year = match env::var("RANK_REFERENCE_YEAR") {
            Ok(raw) => parse_reference_year(&raw)?,
            Err(_) => chrono::Local::now().year(),
        };

        let jobs_path = env::var("RANK_JOBS_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ranking: RankingConfig {
                shortlist_size,
                reference_year,
                jobs_path,
            },
        })
    }
}

pub const DEFAULT_SHORTLIST_SIZE: usize = 10;

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
}

/// Defaults applied to every evaluation run.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    pub shortlist_size: usize,
    /// Year used to close open-ended date ranges such as "2019 - present".
    pub reference_year: i32,
    /// Optional JSON catalog replacing the built-in job configurations.
    pub jobs_path: Option<PathBuf>,
}

fn parse_shortlist_size(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidShortlistSize {
            value: raw.to_string(),
        }),
    }
}

fn parse_reference_year(raw: &str) -> Result<i32, ConfigError> {
    match raw.trim().parse::<i32>() {
        Ok(year) if (1980..=2200).contains(&year) => Ok(year),
        _ => Err(ConfigError::InvalidReferenceYear {
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidShortlistSize { value: String },
    InvalidReferenceYear { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidShortlistSize { value } => write!(
                f,
                "RANK_SHORTLIST_SIZE must be a positive integer (got '{}')",
                value
            ),
            ConfigError::InvalidReferenceYear { value } => write!(
                f,
                "RANK_REFERENCE_YEAR must be a calendar year between 1980 and 2200 (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidShortlistSize { .. }
            | ConfigError::InvalidReferenceYear { .. } => None,
        }
    }
}
