use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub jwt_secret: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    jwt_secret: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    token_ttl_hours: Option<i64>,
    db_max_connections: Option<u32>,
}

impl PartialServerConfig {
    fn from_file(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let Some(path_str) = config_path else {
            return Ok(Self::default());
        };
        let path = Path::new(path_str);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path_str.to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path_str.to_string(),
            source,
        })
    }

    /// Fields set in `self` win over fields set in `lower`.
    fn overlay(self, lower: Self) -> Self {
        Self {
            database_url: self.database_url.or(lower.database_url),
            jwt_secret: self.jwt_secret.or(lower.jwt_secret),
            listen_addr: self.listen_addr.or(lower.listen_addr),
            log_dir: self.log_dir.or(lower.log_dir),
            token_ttl_hours: self.token_ttl_hours.or(lower.token_ttl_hours),
            db_max_connections: self.db_max_connections.or(lower.db_max_connections),
        }
    }
}

fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_db_max_connections() -> u32 {
    10
}

impl ServerConfig {
    /// Loads the configuration: optional TOML file first, then the process
    /// environment (after `.env`), environment overriding file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(config_path, std::env::vars())
    }

    fn load_from<I>(config_path: Option<&str>, env_vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let merged = layered(config_path, env_vars)?;

        Ok(ServerConfig {
            database_url: merged.database_url.ok_or(ConfigError::Missing("DATABASE_URL"))?,
            jwt_secret: merged.jwt_secret.ok_or(ConfigError::Missing("JWT_SECRET"))?,
            listen_addr: merged.listen_addr.unwrap_or_else(default_listen_addr),
            log_dir: merged.log_dir.unwrap_or_else(default_log_dir),
            token_ttl_hours: merged.token_ttl_hours.unwrap_or_else(default_token_ttl_hours),
            db_max_connections: merged
                .db_max_connections
                .unwrap_or_else(default_db_max_connections),
        })
    }

    /// Only resolves `DATABASE_URL`, for tools that never serve requests.
    pub fn load_database_url(config_path: Option<&str>) -> Result<String, ConfigError> {
        dotenv::dotenv().ok();
        layered(config_path, std::env::vars())?
            .database_url
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

fn layered<I>(config_path: Option<&str>, env_vars: I) -> Result<PartialServerConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let file_config = PartialServerConfig::from_file(config_path)?;
    let env_config: PartialServerConfig = envy::from_iter(env_vars)?;
    Ok(env_config.overlay(file_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_only_uses_defaults() {
        let config = ServerConfig::load_from(
            None,
            vars(&[("DATABASE_URL", "postgres://db/app"), ("JWT_SECRET", "s3cret")]),
        )
        .unwrap();

        assert_eq!(config.database_url, "postgres://db/app");
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.listen_addr, "0.0.0.0:8000");
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.token_ttl_hours, 24);
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
database_url = "postgres://file/app"
jwt_secret = "from-file"
listen_addr = "127.0.0.1:9000"
token_ttl_hours = 2
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = ServerConfig::load_from(
            Some(&path),
            vars(&[("JWT_SECRET", "from-env"), ("TOKEN_TTL_HOURS", "48")]),
        )
        .unwrap();

        assert_eq!(config.database_url, "postgres://file/app");
        assert_eq!(config.jwt_secret, "from-env");
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert_eq!(config.token_ttl_hours, 48);
    }

    #[test]
    fn test_missing_jwt_secret_is_an_error() {
        let result = ServerConfig::load_from(None, vars(&[("DATABASE_URL", "postgres://db/app")]));

        assert!(matches!(result, Err(ConfigError::Missing("JWT_SECRET"))));
    }

    #[test]
    fn test_missing_file_is_ignored() {
        let config = ServerConfig::load_from(
            Some("/definitely/not/here.toml"),
            vars(&[("DATABASE_URL", "sqlite::memory:"), ("JWT_SECRET", "x")]),
        )
        .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = ").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let result = ServerConfig::load_from(Some(&path), Vec::new());

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
