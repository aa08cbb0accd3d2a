use std::env;
use std::path::Path;
use std::path::PathBuf;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logger: LoggerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default)]
    pub mode: ServerMode,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Development,
    Production,
}

impl ServerMode {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        match self {
            ServerMode::Development => "identity_service=debug,tower_http=debug",
            ServerMode::Production => "identity_service=info,tower_http=info",
        }
    }
}

/// Postgres connection settings. Without a URL the service keeps users in memory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "JwtConfig::default_expiration_hours")]
    pub expiration_hours: i64,
}

impl JwtConfig {
    fn default_expiration_hours() -> i64 {
        24
    }

    /// Lifetime of issued tokens.
    pub fn token_validity(&self) -> Result<chrono::Duration, ConfigError> {
        if self.expiration_hours <= 0 {
            return Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".into(),
            ));
        }
        chrono::Duration::try_hours(self.expiration_hours).ok_or_else(|| {
            ConfigError::Message(format!(
                "jwt.expiration_hours is out of range: {}",
                self.expiration_hours
            ))
        })
    }
}

/// Log output settings. `RUST_LOG` still wins over `level` when set.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LoggerConfig {
    /// One of trace, debug, info, warn, error. Defaults to the server mode's level.
    pub level: Option<String>,
    /// File that receives a copy of the log, in addition to stdout.
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_limit: u64,
    pub max_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. The file at `path`, when given; otherwise the environment-specific
    ///    config file (config/{environment}.toml) over config/default.toml
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => {
                let run_mode =
                    env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());
                builder
                    .add_source(File::with_name("config/default").required(false))
                    .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            }
        };

        let configuration = builder
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        self.jwt.token_validity()?;
        if self.pagination.max_limit == 0 {
            return Err(ConfigError::Message(
                "pagination.max_limit must be positive".into(),
            ));
        }
        if let Some(level) = &self.logger.level {
            level.parse::<tracing::Level>().map_err(|_| {
                ConfigError::Message(format!("logger.level is not a log level: {}", level))
            })?;
        }
        Ok(())
    }

    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> String {
        match &self.logger.level {
            Some(level) => {
                let level = level.to_ascii_lowercase();
                format!("identity_service={level},tower_http={level}")
            }
            None => self.server.mode.default_log_filter().to_string(),
        }
    }
}
