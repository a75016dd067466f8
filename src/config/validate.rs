use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if let Some(database) = cfg.database.as_ref() {
        if database.url.trim().is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if database.min_idle > database.max_connections {
            errors.push(format!(
                "database.min_idle ({}) must be <= database.max_connections ({})",
                database.min_idle, database.max_connections
            ));
        }
    }

    if cfg.auth.jwt_secret.trim().is_empty() {
        errors.push("auth.jwt_secret must not be empty".to_string());
    }

    if cfg.auth.token_ttl_secs == 0 {
        errors.push("auth.token_ttl_secs must be > 0".to_string());
    }

    if cfg.pagination.default_page_size == 0 {
        errors.push("pagination.default_page_size must be > 0".to_string());
    }

    if cfg.pagination.default_page_size > cfg.pagination.max_page_size {
        errors.push(format!(
            "pagination.default_page_size ({}) must be <= pagination.max_page_size ({})",
            cfg.pagination.default_page_size, cfg.pagination.max_page_size
        ));
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
