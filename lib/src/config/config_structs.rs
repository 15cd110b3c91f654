// lib/src/config/config_structs.rs
use std::path::PathBuf;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "healthease.yaml";
pub const ENV_PREFIX: &str = "HEALTHEASE";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_APPOINTMENTS_URL: &str = "http://localhost:5001/api/appointments";
pub const DEFAULT_STORAGE_PATH: &str = "./healthease_data";

/// Base URL of every REST resource the portal talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    pub auth: String,
    pub patients: String,
    pub doctors: String,
    pub appointments: String,
    pub prescriptions: String,
    pub notifications: String,
    pub chatbot: String,
    pub payments: String,
}

impl ApiEndpoints {
    /// Every endpoint under one backend, e.g. a staging host.
    pub fn rooted_at(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        ApiEndpoints {
            auth: format!("{}/api/auth", base),
            patients: format!("{}/api/patients", base),
            doctors: format!("{}/api/doctors", base),
            appointments: format!("{}/api/appointments", base),
            prescriptions: format!("{}/api/prescriptions", base),
            notifications: format!("{}/api/notifications", base),
            chatbot: format!("{}/api/chatbot/openai/service", base),
            payments: format!("{}/api/payments", base),
        }
    }
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        ApiEndpoints {
            appointments: DEFAULT_APPOINTMENTS_URL.to_string(),
            ..ApiEndpoints::rooted_at(DEFAULT_BACKEND_URL)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { path: PathBuf::from(DEFAULT_STORAGE_PATH) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string(), file: None }
    }
}

/// No timeout unless configured; requests are single-attempt either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: u64,
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { capacity: caching::DEFAULT_CAPACITY, ttl_secs: None }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub api: ApiEndpoints,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    pub cache: CacheConfig,
}
