// lib/src/config/config_helpers.rs
use std::path::PathBuf;
use config::{Config, Environment, File};
use log::{debug, info, warn};
use models::{PortalError, PortalResult};
use super::config_structs::{PortalConfig, DEFAULT_CONFIG_PATH, ENV_PREFIX};

fn config_error(err: config::ConfigError) -> PortalError {
    PortalError::ConfigurationError(err.to_string())
}

/// Layers built-in defaults, the config file and `HEALTHEASE__*` variables.
///
/// An explicitly named file must exist; the default `healthease.yaml` is optional.
pub fn load_portal_config(config_file_path: Option<&str>) -> PortalResult<PortalConfig> {
    let explicit = config_file_path.is_some();
    let path_to_use = config_file_path
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    info!("Attempting to load portal config from {:?}", path_to_use);

    let defaults = Config::try_from(&PortalConfig::default()).map_err(config_error)?;
    let mut builder = Config::builder().add_source(defaults);

    if path_to_use.exists() {
        builder = builder.add_source(File::from(path_to_use.as_path()));
    } else if explicit {
        return Err(PortalError::ConfigurationError(format!(
            "Config file not found at {}",
            path_to_use.display()
        )));
    } else {
        warn!("Config file not found at {}. Using default portal config.", path_to_use.display());
    }

    let merged = builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()
        .map_err(config_error)?;
    let config: PortalConfig = merged.try_deserialize().map_err(config_error)?;
    debug!("Loaded portal config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn should_overlay_yaml_on_defaults() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "api:\n  auth: https://staging.example.org/api/auth\ncache:\n  capacity: 32\nlogging:\n  level: debug"
        )
        .unwrap();

        let config = load_portal_config(file.path().to_str()).unwrap();
        assert_eq!(config.api.auth, "https://staging.example.org/api/auth");
        assert_eq!(config.api.appointments, "http://localhost:5001/api/appointments");
        assert_eq!(config.cache.capacity, 32);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.http.timeout_secs, None);
    }

    #[test]
    fn should_fail_when_named_file_is_missing() {
        let err = load_portal_config(Some("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, PortalError::ConfigurationError(_)));
    }
}
