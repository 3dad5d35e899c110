use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Where inventory state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl StorageBackend {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(format!(
                "Invalid STORAGE_BACKEND: {}. Must be one of: [\"postgres\", \"memory\"]",
                s
            )),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub storage: StorageBackend,
    pub log_level: String,
    pub log_json: bool,
    pub http_port: u16,
    pub environment: String,
    pub auth_secret: String,
    pub session_ttl_secs: i64,
    pub tester_retention_secs: u64,
    pub expiry_sweep_interval_secs: u64,
}

/// Signing secret used when `AUTH_SECRET` is unset; accepted only in development
pub const DEVELOPMENT_AUTH_SECRET: &str = "musco-development-secret";

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let acquire_timeout_secs = env_parse::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);
        let idle_timeout_secs = env_parse::<u64>("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600); // 10 minutes
        let max_lifetime_secs = env_parse::<u64>("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800); // 30 minutes
        let test_before_acquire = env_parse::<bool>("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true);

        let config = Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if self.acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/musco".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase();

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(s) => StorageBackend::from_str(&s)?,
            Err(_) => StorageBackend::Postgres,
        };

        // The in-memory backend never needs a database URL
        let database = match storage {
            StorageBackend::Postgres => DatabaseConfig::from_env()?,
            StorageBackend::Memory => DatabaseConfig::default(),
        };

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_json = env::var("LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let http_port = env_parse::<u16>("HTTP_PORT").unwrap_or(8360);

        let auth_secret = env::var("AUTH_SECRET").unwrap_or_default();
        let session_ttl_secs = env_parse::<i64>("SESSION_TTL_SECS").unwrap_or(86_400);
        let tester_retention_secs = env_parse::<u64>("TESTER_RETENTION_SECS").unwrap_or(600);
        let expiry_sweep_interval_secs = env_parse::<u64>("EXPIRY_SWEEP_INTERVAL_SECS").unwrap_or(30);

        let config = Self {
            database,
            storage,
            log_level: log_level.to_lowercase(),
            log_json,
            http_port,
            environment,
            auth_secret: if auth_secret.is_empty() {
                DEVELOPMENT_AUTH_SECRET.to_string()
            } else {
                auth_secret
            },
            session_ttl_secs,
            tester_retention_secs,
            expiry_sweep_interval_secs,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                self.log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&self.environment.as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                self.environment, valid_environments
            ));
        }

        if self.is_production() && self.storage == StorageBackend::Memory {
            return Err("STORAGE_BACKEND=memory is not allowed in production".to_string());
        }

        if !self.is_development()
            && (self.auth_secret.is_empty() || self.auth_secret == DEVELOPMENT_AUTH_SECRET)
        {
            return Err(format!(
                "AUTH_SECRET must be set explicitly in {}",
                self.environment
            ));
        }

        if self.session_ttl_secs <= 0 {
            return Err("SESSION_TTL_SECS must be greater than 0".to_string());
        }

        if self.tester_retention_secs == 0 || self.expiry_sweep_interval_secs == 0 {
            return Err(
                "TESTER_RETENTION_SECS and EXPIRY_SWEEP_INTERVAL_SECS must be greater than 0"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    /// Retention window for tester records
    pub fn tester_retention(&self) -> Duration {
        Duration::from_secs(self.tester_retention_secs)
    }

    /// How often the expiry sweeper runs
    pub fn expiry_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.expiry_sweep_interval_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            storage: StorageBackend::Postgres,
            log_level: "info".to_string(),
            log_json: false,
            http_port: 8360,
            environment: "development".to_string(),
            auth_secret: DEVELOPMENT_AUTH_SECRET.to_string(),
            session_ttl_secs: 86_400,
            tester_retention_secs: 600,
            expiry_sweep_interval_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 8360);
        assert_eq!(config.tester_retention(), Duration::from_secs(600));
        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_rejected_in_production() {
        let config = AppConfig {
            environment: "production".to_string(),
            storage: StorageBackend::Memory,
            auth_secret: "s3cr3t-from-vault".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_development_secret_rejected_outside_development() {
        for environment in ["staging", "production"] {
            let config = AppConfig {
                environment: environment.to_string(),
                ..AppConfig::default()
            };
            assert!(config.validate().is_err(), "{} accepted the default secret", environment);

            let config = AppConfig {
                environment: environment.to_string(),
                auth_secret: "s3cr3t-from-vault".to_string(),
                ..AppConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_invalid_log_level() {
        let config = AppConfig {
            log_level: "verbose".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::from_str("Memory").unwrap(), StorageBackend::Memory);
        assert_eq!(StorageBackend::from_str("postgresql").unwrap(), StorageBackend::Postgres);
        assert!(StorageBackend::from_str("sqlite").is_err());
    }
}
