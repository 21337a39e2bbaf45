//! Layered configuration loading
//!
//! Sources, later ones winning:
//! 1. `config/default.{toml,yaml,json}` (optional)
//! 2. `config/{environment}` (optional)
//! 3. `MV__*` environment variables, `__` separating nested keys
//!    (`MV__VERIFICATION__VA_API__API_KEY`)
//!
//! A `.env` file is read into the process environment first.

use ::config::{Config, Environment as EnvSource, File};
use mv_shared::config::{AppConfig, Environment};
use std::path::Path;
use tracing::debug;

use crate::InfrastructureError;

pub const ENV_PREFIX: &str = "MV";

/// Load configuration relative to the working directory
pub fn load_config() -> Result<AppConfig, InfrastructureError> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "Loaded .env file");
    }
    load_config_from(Path::new("."), Environment::from_env())
}

/// Load configuration with `config/` resolved under `root`
pub fn load_config_from(
    root: &Path,
    environment: Environment,
) -> Result<AppConfig, InfrastructureError> {
    let default_file = root.join("config/default");
    let environment_file = root.join(environment.config_name());

    let settings = Config::builder()
        .set_default("environment", environment.to_string())?
        .add_source(File::from(default_file).required(false))
        .add_source(File::from(environment_file).required(false))
        .add_source(
            EnvSource::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    Ok(config)
}
