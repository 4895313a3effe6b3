mod types;

pub use types::*;

use crate::{Error, Result, raster::OutputFormat};
use std::{env, path::Path};
use tracing::{debug, info};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Loads the configuration named by `CONFIG_PATH`.
///
/// Without `CONFIG_PATH`, a missing `config.yaml` falls back to the built-in
/// defaults. Environment overrides are applied last, then the result is
/// validated.
pub async fn load() -> Result<Config> {
    let explicit = env::var("CONFIG_PATH").ok();
    let config_path = explicit
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let mut config = if explicit.is_none() && !Path::new(&config_path).exists() {
        info!("No {} found, using default configuration", config_path);
        Config::default()
    } else {
        debug!("Loading configuration from: {}", config_path);
        let config_str = tokio::fs::read_to_string(&config_path).await?;
        from_yaml(&config_str)?
    };

    config.apply_env_overrides_with(|key| env::var(key).ok());
    config.validate()?;

    Ok(config)
}

pub fn from_yaml(config_str: &str) -> Result<Config> {
    Ok(serde_yaml::from_str(config_str)?)
}

impl Config {
    pub fn apply_env_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint_name) = lookup("INFERENCE_ENDPOINT_NAME") {
            self.inference.endpoint_name = endpoint_name;
        }
        if let Some(output_dir) = lookup("IMAGE_OUTPUT_DIR") {
            self.storage.output_dir = output_dir;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.output_format()?;

        if self.inference.timeout_secs == 0 {
            return Err(Error::config("inference.timeout_secs must be greater than zero"));
        }

        match self.inference.provider {
            InferenceProvider::SageMaker if self.inference.endpoint_name.trim().is_empty() => Err(
                Error::config("inference.endpoint_name is required for the sagemaker provider"),
            ),
            InferenceProvider::Http if self.inference.url.is_none() => Err(Error::config(
                "inference.url is required for the http provider",
            )),
            _ => Ok(()),
        }
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        self.storage
            .format
            .parse()
            .map_err(|_| Error::config(format!("unsupported storage.format '{}'", self.storage.format)))
    }
}
