use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret used to sign tokens; required
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
    /// Argon2 iteration count
    pub password_hash_cost: u32,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"[hidden]")
            .field("algorithm", &self.algorithm)
            .field(
                "access_token_expire_minutes",
                &self.access_token_expire_minutes,
            )
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
            password_hash_cost: 3,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost".to_string(),
                "http://127.0.0.1".to_string(),
                "http://frontend".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from files and the environment, then validate it
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins"),
            )
            .build()?;

        let mut app_config: Self = config.try_deserialize()?;
        app_config.apply_legacy_env(|name| std::env::var(name).ok());
        app_config.validate()?;

        Ok(app_config)
    }

    /// Fill unset values from the unprefixed `SECRET_KEY` and `DATABASE_URL`
    pub fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.auth.secret_key.is_empty() {
            if let Some(secret) = lookup("SECRET_KEY") {
                self.auth.secret_key = secret;
            }
        }

        if self.storage.database_url.is_none() {
            self.storage.database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        }
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let invalid = |msg: &str| Err(config::ConfigError::Message(msg.to_string()));

        if self.auth.secret_key.trim().is_empty() {
            return invalid("auth.secret_key (or SECRET_KEY) must be set");
        }

        if self.auth.password_hash_cost < 1 {
            return invalid("auth.password_hash_cost must be at least 1");
        }

        if self.storage.backend == StorageBackend::Postgres && self.storage.database_url.is_none()
        {
            return invalid("storage.database_url (or DATABASE_URL) is required for postgres");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.secret_key = "test-secret".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.algorithm, "HS256");
        assert_eq!(config.auth.access_token_expire_minutes, 30);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.cors.allowed_origins.len(), 3);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_missing_secret_is_rejected() {
        assert!(AppConfig::default().validate().is_err());
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_zero_hash_cost_is_rejected() {
        let mut config = valid_config();
        config.auth.password_hash_cost = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = valid_config();
        config.storage.backend = StorageBackend::Postgres;
        assert!(config.validate().is_err());

        config.storage.database_url = Some("postgres://localhost/tasks".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_legacy_env_fills_unset_values_only() {
        let lookup = |name: &str| match name {
            "SECRET_KEY" => Some("from-env".to_string()),
            "DATABASE_URL" => Some("postgres://env/db".to_string()),
            _ => None,
        };

        let mut config = AppConfig::default();
        config.apply_legacy_env(lookup);
        assert_eq!(config.auth.secret_key, "from-env");
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://env/db")
        );

        let mut config = valid_config();
        config.storage.database_url = Some("postgres://file/db".to_string());
        config.apply_legacy_env(lookup);
        assert_eq!(config.auth.secret_key, "test-secret");
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("postgres://file/db")
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", valid_config());
        assert!(!debug.contains("test-secret"));
    }
}
