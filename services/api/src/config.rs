//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use sqlx::postgres::PgConnectOptions;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the PostgreSQL database lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatabaseTarget {
    /// A full `postgres://` URL from `DATABASE_URL`.
    Url(String),
    /// Discrete `DB_*` settings.
    Parts {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        database: String,
    },
}

/// Connection settings for the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub target: DatabaseTarget,
    /// Schema placed on the `search_path` of every pooled connection.
    pub schema: Option<String>,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        let options = match &self.target {
            DatabaseTarget::Url(url) => PgConnectOptions::from_str(url).map_err(|e| {
                ConfigError::InvalidValue("DATABASE_URL".to_string(), e.to_string())
            })?,
            DatabaseTarget::Parts {
                host,
                port,
                user,
                password,
                database,
            } => {
                let options = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .username(user)
                    .database(database);
                match password {
                    Some(password) => options.password(password),
                    None => options,
                }
            }
        };

        Ok(match &self.schema {
            Some(schema) => options.options([("search_path", schema.as_str())]),
            None => options,
        })
    }
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database: DatabaseConfig,
    pub log_level: Level,
    pub cors_origin: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        // --- Server Settings ---
        let bind_address_str = match var("BIND_ADDRESS") {
            Some(address) => address,
            None => format!("0.0.0.0:{}", var("PORT").unwrap_or_else(|| "3001".to_string())),
        };
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = var("CORS_ORIGIN");
        let static_dir = var("STATIC_DIR").map(PathBuf::from);

        // --- Database Settings ---
        let target = match var("DATABASE_URL") {
            Some(url) => DatabaseTarget::Url(url),
            None => {
                let required = |key: &str| {
                    var(key).ok_or_else(|| ConfigError::MissingVar(format!("DATABASE_URL or {key}")))
                };
                let port = match var("DB_PORT") {
                    Some(port) => port.parse::<u16>().map_err(|e| {
                        ConfigError::InvalidValue("DB_PORT".to_string(), e.to_string())
                    })?,
                    None => 5432,
                };
                DatabaseTarget::Parts {
                    host: required("DB_HOST")?,
                    port,
                    user: required("DB_USER")?,
                    password: var("DB_PASSWORD"),
                    database: required("DB_NAME")?,
                }
            }
        };

        let schema = var("DB_SCHEMA")
            .map(|schema| validate_identifier("DB_SCHEMA", schema))
            .transpose()?;

        let max_connections = match var("DB_MAX_CONNECTIONS") {
            Some(value) => value.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string(), e.to_string())
            })?,
            None => 5,
        };

        let run_migrations = match var("RUN_MIGRATIONS") {
            Some(value) => parse_bool("RUN_MIGRATIONS", &value)?,
            None => true,
        };

        Ok(Self {
            bind_address,
            database: DatabaseConfig {
                target,
                schema,
                max_connections,
                run_migrations,
            },
            log_level,
            cors_origin,
            static_dir,
        })
    }
}

/// Schema names end up in a connection parameter, so only plain identifiers are accepted.
fn validate_identifier(key: &str, value: String) -> Result<String, ConfigError> {
    let mut chars = value.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a valid identifier", value),
        ))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn database_url_with_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://u:p@localhost/alumni")]).unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.log_level, Level::INFO);
        assert_eq!(
            config.database.target,
            DatabaseTarget::Url("postgres://u:p@localhost/alumni".to_string())
        );
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert!(config.cors_origin.is_none());
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn discrete_parts_and_port_fallback() {
        let config = load(&[
            ("PORT", "8080"),
            ("DB_HOST", "db.internal"),
            ("DB_USER", "alumni"),
            ("DB_PASSWORD", "secret"),
            ("DB_NAME", "proj"),
            ("DB_SCHEMA", "jc6292"),
            ("RUN_MIGRATIONS", "false"),
        ])
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            config.database.target,
            DatabaseTarget::Parts {
                host: "db.internal".to_string(),
                port: 5432,
                user: "alumni".to_string(),
                password: Some("secret".to_string()),
                database: "proj".to_string(),
            }
        );
        assert_eq!(config.database.schema.as_deref(), Some("jc6292"));
        assert!(!config.database.run_migrations);
        assert!(config.database.connect_options().is_ok());
    }

    #[test]
    fn missing_database_settings_are_reported() {
        let err = load(&[("DB_HOST", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(name) if name.contains("DB_USER")));
    }

    #[test]
    fn schema_must_be_an_identifier() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("DB_SCHEMA", "public; DROP TABLE student"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "DB_SCHEMA"));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/alumni"),
            ("RUST_LOG", "chatty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(key, _) if key == "RUST_LOG"));
    }
}
