use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use rust_decimal::Decimal;

use crate::workflows::claims::{ConfigurationError, PricingConfig};

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
    pub pricing: PricingSettings,
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
        let ansi = env::var("APP_LOG_ANSI")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let pricing = PricingSettings {
            path: env::var_os("APP_PRICING_CONFIG").map(PathBuf::from),
            labor_rate: decimal_var("APP_LABOR_RATE")?,
            paint_rate: decimal_var("APP_PAINT_RATE")?,
            supplies_rate: decimal_var("APP_SUPPLIES_RATE")?,
            tax_rate: decimal_var("APP_TAX_RATE")?,
            total_loss_ratio: decimal_var("APP_TOTAL_LOSS_RATIO")?,
            default_deductible: decimal_var("APP_DEFAULT_DEDUCTIBLE")?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            pricing,
        })
    }
}

fn decimal_var(key: &'static str) -> Result<Option<Decimal>, ConfigError> {
    match env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidDecimal { key, value: raw }),
        Err(_) => Ok(None),
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

/// Where pricing tables come from, plus jurisdiction-level rate overrides.
#[derive(Debug, Clone, Default)]
pub struct PricingSettings {
    pub path: Option<PathBuf>,
    pub labor_rate: Option<Decimal>,
    pub paint_rate: Option<Decimal>,
    pub supplies_rate: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub total_loss_ratio: Option<Decimal>,
    pub default_deductible: Option<Decimal>,
}

impl PricingSettings {
    /// Loads the configured tables (or the built-in ones), applies overrides, and validates.
    pub fn resolve(&self) -> Result<PricingConfig, ConfigurationError> {
        let mut config = match &self.path {
            Some(path) => PricingConfig::from_path(path)?,
            None => PricingConfig::standard(),
        };

        if let Some(rate) = self.labor_rate {
            config.rates.labor_rate = rate;
        }
        if let Some(rate) = self.paint_rate {
            config.rates.paint_rate = rate;
        }
        if let Some(rate) = self.supplies_rate {
            config.rates.supplies_rate = rate;
        }
        if let Some(rate) = self.tax_rate {
            config.rates.tax_rate = rate;
        }
        if let Some(ratio) = self.total_loss_ratio {
            config.settlement.total_loss_ratio = ratio;
        }
        if let Some(deductible) = self.default_deductible {
            config.settlement.default_deductible = deductible;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidDecimal { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { source } => {
                write!(f, "APP_HOST must be a valid IP address: {}", source)
            }
            ConfigError::InvalidDecimal { key, value } => {
                write!(f, "{} must be a decimal number (found '{}')", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidDecimal { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
