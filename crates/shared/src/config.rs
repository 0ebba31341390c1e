//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Session, blacklist and password hashing settings.
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for signing access tokens.
    pub access_secret: String,
    /// Secret key for signing refresh tokens.
    pub refresh_secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
    /// Refresh token expiration in seconds.
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> u64 {
    604_800 // 7 days
}

/// Session and credential settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// How long a logged-out access token stays blacklisted.
    #[serde(default = "default_blacklist_ttl")]
    pub blacklist_ttl_secs: u64,
    /// Interval between blacklist sweeps.
    #[serde(default = "default_sweep_interval")]
    pub blacklist_sweep_interval_secs: u64,
    /// Argon2 memory cost in KiB.
    #[serde(default = "default_password_memory")]
    pub password_memory_kib: u32,
    /// Argon2 iteration count.
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,
    /// Argon2 degree of parallelism.
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            blacklist_ttl_secs: default_blacklist_ttl(),
            blacklist_sweep_interval_secs: default_sweep_interval(),
            password_memory_kib: default_password_memory(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

fn default_blacklist_ttl() -> u64 {
    3600 // 1 hour
}

fn default_sweep_interval() -> u64 {
    600 // 10 minutes
}

fn default_password_memory() -> u32 {
    19_456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails [`AppConfig::validate`].
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that deserialize but cannot run safely.
    ///
    /// Access and refresh secrets must be non-empty and distinct, otherwise an
    /// access token would verify as a refresh token. The sweep interval must
    /// be positive.
    ///
    /// # Errors
    ///
    /// Returns [`config::ConfigError::Message`] naming the offending setting.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.jwt.access_secret.is_empty() || self.jwt.refresh_secret.is_empty() {
            return Err(config::ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must not be empty".to_string(),
            ));
        }
        if self.jwt.access_secret == self.jwt.refresh_secret {
            return Err(config::ConfigError::Message(
                "jwt.access_secret and jwt.refresh_secret must differ".to_string(),
            ));
        }
        if self.auth.blacklist_sweep_interval_secs == 0 {
            return Err(config::ConfigError::Message(
                "auth.blacklist_sweep_interval_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_applies_defaults() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally")),
                ("TALLY__JWT__ACCESS_SECRET", Some("access")),
                ("TALLY__JWT__REFRESH_SECRET", Some("refresh")),
            ],
            || {
                let config = AppConfig::load().unwrap();

                assert_eq!(config.database.url, "postgres://localhost/tally");
                assert_eq!(config.jwt.access_secret, "access");
                assert_eq!(config.jwt.refresh_secret, "refresh");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.auth.blacklist_ttl_secs, 3600);
                assert_eq!(config.auth.password_iterations, 2);
            },
        );
    }

    #[test]
    fn test_load_rejects_shared_jwt_secret() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally")),
                ("TALLY__JWT__ACCESS_SECRET", Some("same")),
                ("TALLY__JWT__REFRESH_SECRET", Some("same")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert!(err.to_string().contains("must differ"));
            },
        );
    }

    #[test]
    fn test_load_rejects_zero_sweep_interval() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally")),
                ("TALLY__JWT__ACCESS_SECRET", Some("access")),
                ("TALLY__JWT__REFRESH_SECRET", Some("refresh")),
                ("TALLY__AUTH__BLACKLIST_SWEEP_INTERVAL_SECS", Some("0")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert!(err.to_string().contains("blacklist_sweep_interval_secs"));
            },
        );
    }

    #[test]
    fn test_load_fails_without_jwt_secrets() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally")),
                ("TALLY__JWT__ACCESS_SECRET", None::<&str>),
                ("TALLY__JWT__REFRESH_SECRET", None),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
