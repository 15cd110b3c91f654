// lib/src/config/mod.rs
pub mod config_helpers;
pub mod config_structs;

pub use config_helpers::load_portal_config;
pub use config_structs::{
    ApiEndpoints, CacheConfig, HttpConfig, LoggingConfig, PortalConfig, StorageConfig,
    DEFAULT_CONFIG_PATH, ENV_PREFIX,
};
