use domain::{BookingPolicy, DomainResult};
use serde::Deserialize;
use shared::identity::{IdentityError, IdentityVerifier, TokenAlgorithm};
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    /// Identity-provider token verification
    pub auth: AuthConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// RS256 (provider public key) or HS256 (shared secret, development only)
    #[serde(default = "default_auth_algorithm")]
    pub algorithm: String,

    /// Provider public key in PEM format, required for RS256
    #[serde(default)]
    pub public_key: String,

    /// Shared secret, required for HS256
    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub issuer: Option<String>,

    #[serde(default)]
    pub audience: Option<String>,

    /// Leeway in seconds for clock skew tolerance
    #[serde(default = "default_auth_leeway")]
    pub leeway_secs: u64,

    /// Value of the `role` claim that grants admin routes
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    #[serde(default = "default_opening_hour")]
    pub opening_hour: u32,

    #[serde(default = "default_closing_hour")]
    pub closing_hour: u32,

    #[serde(default = "default_no_show_grace")]
    pub no_show_grace_minutes: i64,

    /// Fixed offset of the venue's wall clock from UTC
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            opening_hour: default_opening_hour(),
            closing_hour: default_closing_hour(),
            no_show_grace_minutes: default_no_show_grace(),
            utc_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_jobs_enabled")]
    pub enabled: bool,

    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Whether missing catalog courts are created at startup
    #[serde(default = "default_ensure_catalog")]
    pub ensure_catalog: bool,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: default_jobs_enabled(),
            sweep_interval_secs: default_sweep_interval(),
            ensure_catalog: default_ensure_catalog(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_auth_algorithm() -> String {
    "RS256".to_string()
}
fn default_auth_leeway() -> u64 {
    30
}
fn default_admin_role() -> String {
    "admin".to_string()
}
fn default_opening_hour() -> u32 {
    5
}
fn default_closing_hour() -> u32 {
    22
}
fn default_no_show_grace() -> i64 {
    10
}
fn default_jobs_enabled() -> bool {
    true
}
fn default_sweep_interval() -> u64 {
    60
}
fn default_ensure_catalog() -> bool {
    true
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with CR__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CR").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching the file system. Validation is skipped.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [auth]
            algorithm = "HS256"
            secret = "test-identity-secret"
            leeway_secs = 0
            admin_role = "admin"

            [booking]
            opening_hour = 5
            closing_hour = 22
            no_show_grace_minutes = 10
            utc_offset_minutes = 0

            [jobs]
            enabled = false
            sweep_interval_secs = 60
            ensure_catalog = false
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "CR__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.booking.opening_hour >= self.booking.closing_hour
            || self.booking.closing_hour > 24
        {
            return Err(ConfigValidationError::InvalidValue(
                "booking hours must satisfy opening_hour < closing_hour <= 24".to_string(),
            ));
        }

        if self.booking.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigValidationError::InvalidValue(
                "booking.utc_offset_minutes must be within +/-18 hours".to_string(),
            ));
        }

        if self.booking.no_show_grace_minutes < 0 {
            return Err(ConfigValidationError::InvalidValue(
                "booking.no_show_grace_minutes cannot be negative".to_string(),
            ));
        }

        match self
            .auth
            .algorithm
            .parse::<TokenAlgorithm>()
            .map_err(|e| ConfigValidationError::InvalidValue(e.to_string()))?
        {
            TokenAlgorithm::Rs256 if self.auth.public_key.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "CR__AUTH__PUBLIC_KEY must be set for RS256".to_string(),
                ))
            }
            TokenAlgorithm::Hs256 if self.auth.secret.is_empty() => {
                return Err(ConfigValidationError::MissingRequired(
                    "CR__AUTH__SECRET must be set for HS256".to_string(),
                ))
            }
            _ => {}
        }

        if self.jobs.enabled && self.jobs.sweep_interval_secs == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "jobs.sweep_interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigValidationError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| {
                ConfigValidationError::InvalidValue(format!(
                    "Invalid socket address {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }

    pub fn booking_policy(&self) -> DomainResult<BookingPolicy> {
        BookingPolicy::new(
            self.booking.opening_hour,
            self.booking.closing_hour,
            self.booking.no_show_grace_minutes,
            self.booking.utc_offset_minutes,
        )
    }

    /// Builds the token verifier described by the `auth` section.
    pub fn identity_verifier(&self) -> Result<IdentityVerifier, IdentityError> {
        let verifier = match self.auth.algorithm.parse::<TokenAlgorithm>()? {
            TokenAlgorithm::Rs256 => IdentityVerifier::from_rsa_pem(&self.auth.public_key)?,
            TokenAlgorithm::Hs256 => IdentityVerifier::from_secret(&self.auth.secret)?,
        };
        let mut verifier = verifier.with_leeway(self.auth.leeway_secs);
        if let Some(issuer) = &self.auth.issuer {
            verifier = verifier.with_issuer(issuer.clone());
        }
        if let Some(audience) = &self.auth.audience {
            verifier = verifier.with_audience(audience.clone());
        }
        Ok(verifier)
    }
}
