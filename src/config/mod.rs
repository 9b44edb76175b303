use std::env;
use std::fmt;

use thiserror::Error;
use tracing::info;

const DEV_SECRET_KEY: &str = "pantry-development-secret";

/// Token lifetime bounds: one hour to ten years
const JWT_EXPIRY_HOURS: std::ops::RangeInclusive<u64> = 1..=87_600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub passwords: PasswordConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    /// None keeps tokens valid until the secret changes
    pub jwt_expiry_hours: Option<u64>,
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl PasswordConfig {
    pub const fn standard() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }

    /// Cheapest parameters argon2 accepts, for test runs
    pub const fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup, so tests don't touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("test") => Environment::Test,
            _ => Environment::Development,
        };

        let defaults = match environment {
            Environment::Production => Self::production(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        };

        defaults.with_overrides(&lookup)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("SECRET_KEY") {
            Some(secret) if !secret.is_empty() => self.security.secret_key = secret,
            _ if self.environment == Environment::Production => {
                return Err(ConfigError::Missing("SECRET_KEY"));
            }
            _ => {}
        }

        if let Some(v) = lookup("PORT") {
            self.port = parse_var("PORT", &v)?;
        }

        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        if self.environment == Environment::Test {
            self.database.url = test_database_url(&self.database.url)?;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", &v)?;
        }

        if let Some(v) = lookup("SECURITY_JWT_EXPIRY_HOURS") {
            let hours: u64 = parse_var("SECURITY_JWT_EXPIRY_HOURS", &v)?;
            if !JWT_EXPIRY_HOURS.contains(&hours) {
                return Err(ConfigError::Invalid {
                    name: "SECURITY_JWT_EXPIRY_HOURS",
                    value: v,
                });
            }
            self.security.jwt_expiry_hours = Some(hours);
        }
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            port: 5000,
            database: DatabaseConfig {
                url: "postgres://localhost/pantry".to_string(),
                max_connections: 10,
                acquire_timeout_secs: 30,
            },
            security: SecurityConfig {
                secret_key: DEV_SECRET_KEY.to_string(),
                jwt_expiry_hours: None,
                cors_origins: Vec::new(),
            },
            passwords: PasswordConfig::standard(),
        }
    }

    fn test() -> Self {
        Self {
            environment: Environment::Test,
            database: DatabaseConfig {
                url: "postgres://localhost/pantry".to_string(),
                max_connections: 5,
                acquire_timeout_secs: 5,
            },
            passwords: PasswordConfig::minimal(),
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            port: 5000,
            database: DatabaseConfig {
                url: "postgres://localhost/pantry".to_string(),
                max_connections: 50,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                secret_key: String::new(),
                jwt_expiry_hours: None,
                cors_origins: Vec::new(),
            },
            passwords: PasswordConfig::standard(),
        }
    }

    /// Startup summary, secret redacted
    pub fn log_summary(&self) {
        info!("Pantry API config: environment={:?}", self.environment);
        info!("  port: {}", self.port);
        info!("  database: {}", redact_url(&self.database.url));
        info!("  max connections: {}", self.database.max_connections);
        match self.security.jwt_expiry_hours {
            Some(hours) => info!("  token expiry: {}h", hours),
            None => info!("  token expiry: none (valid until SECRET_KEY changes)"),
        }
        info!("  password hashing: {:?}", self.passwords);
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// Swap the database name for its `_test` twin
fn test_database_url(base: &str) -> Result<String, ConfigError> {
    let mut url = url::Url::parse(base).map_err(|_| ConfigError::InvalidDatabaseUrl(base.to_string()))?;
    let name = url.path().trim_start_matches('/').to_string();
    if name.is_empty() {
        return Err(ConfigError::InvalidDatabaseUrl(base.to_string()));
    }
    if !name.ends_with("_test") {
        url.set_path(&format!("/{}_test", name));
    }
    Ok(url.into())
}

fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => {
            let _ = url.set_password(Some("****"));
            url.into()
        }
        Ok(url) => url.into(),
        Err(_) => "<invalid url>".to_string(),
    }
}
