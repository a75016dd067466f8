use std::path::{Path, PathBuf};

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Points at an env file other than `<crate root>/.env`.
pub const ENV_FILE_VAR: &str = "APP_ENV_FILE";

pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";

    /// `APP_ENV_FILE` if set, otherwise `.env` in the crate root.
    fn env_file() -> PathBuf {
        std::env::var_os(ENV_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"))
    }

    fn load_dotenv() {
        // Falls back to a .env in the working directory; a missing file is fine.
        let _ = dotenvy::from_path(Self::env_file()).or_else(|_| dotenvy::dotenv().map(|_| ()));
    }

    fn environment() -> config_rs::Environment {
        config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
    }

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn from_environment(environment: config_rs::Environment) -> Result<Self> {
        let settings = config_rs::Config::builder()
            .add_source(environment)
            .build()
            .context("failed to read environment variables for config")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into config")?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn from_env() -> Result<Self> {
        Self::load_dotenv();
        Self::from_environment(Self::environment())
    }
}
