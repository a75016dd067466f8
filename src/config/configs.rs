use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{defaults, envconfig::EnvConfig, validate};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub logging: LoggingConfig,
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        <Self as EnvConfig>::from_env()
    }

    pub fn require_database(&self) -> Result<&DatabaseConfig> {
        self.database
            .as_ref()
            .context("database config missing; set APP_DATABASE__URL")
    }
}

impl EnvConfig for AppConfig {
    fn validate(&self) -> Result<()> {
        validate::validate(self)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            host: defaults::DEFAULT_HOST.to_string(),
            port: defaults::DEFAULT_PORT as u16,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub rust_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            rust_log: defaults::DEFAULT_RUST_LOG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_db_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_db_min_idle")]
    pub min_idle: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: defaults::DEFAULT_TOKEN_TTL_SECS as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaginationConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: defaults::DEFAULT_PAGE_SIZE as u64,
            max_page_size: defaults::DEFAULT_MAX_PAGE_SIZE as u64,
        }
    }
}

impl PaginationConfig {
    /// Caps a caller-supplied page size; zero passes through so the
    /// repository can reject it.
    pub fn clamp(&self, page_size: Option<u64>) -> u64 {
        page_size
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }
}

fn default_db_max_connections() -> u32 {
    defaults::DEFAULT_DB_MAX_CONNECTIONS as u32
}

fn default_db_min_idle() -> u32 {
    defaults::DEFAULT_DB_MIN_IDLE as u32
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, PaginationConfig};

    #[test]
    fn defaults_leave_database_unset() {
        let cfg = AppConfig::default();
        assert!(cfg.database.is_none());
        assert!(cfg.require_database().is_err());
        assert_eq!(cfg.general.port, 3000);
        assert_eq!(cfg.auth.token_ttl_secs, 3600);
    }

    #[test]
    fn clamp_applies_default_and_ceiling() {
        let pagination = PaginationConfig {
            default_page_size: 10,
            max_page_size: 50,
        };
        assert_eq!(pagination.clamp(None), 10);
        assert_eq!(pagination.clamp(Some(20)), 20);
        assert_eq!(pagination.clamp(Some(500)), 50);
        assert_eq!(pagination.clamp(Some(0)), 0);
    }
}
