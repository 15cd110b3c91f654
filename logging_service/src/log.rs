// logging_service/src/log.rs
//! Logging for the portal client.
//!
//! Two channels: the `log` facade (initialised here with simplelog) for
//! diagnostics, and a structured slog audit trail for security-relevant
//! events such as sign-in, sign-out and guard denials.

use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::str::FromStr;
use anyhow::{Context, Result};
use async_trait::async_trait;
use caching::Cache;
use chrono::Utc;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use slog::{info, o, warn, Drain, Logger};
use uuid::Uuid;

/// Installs the global `log` backend: terminal output plus an optional append-only file.
pub fn init_logging(level: &str, file: Option<&Path>) -> Result<()> {
    let level = LevelFilter::from_str(level).unwrap_or(LevelFilter::Info);
    let config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];
    if let Some(path) = file {
        let handle = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {:?}", path))?;
        loggers.push(WriteLogger::new(level, config, handle));
    }

    CombinedLogger::init(loggers).context("Logger already initialised")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Login,
    LoginFailed,
    Logout,
    Registration,
    GuardDenied,
    ProfileSubmitted,
}

impl fmt::Display for AuditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditKind::Login => "login",
            AuditKind::LoginFailed => "login_failed",
            AuditKind::Logout => "logout",
            AuditKind::Registration => "registration",
            AuditKind::GuardDenied => "guard_denied",
            AuditKind::ProfileSubmitted => "profile_submitted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub kind: AuditKind,
    pub actor: Option<String>,
    pub detail: String,
    pub timestamp: String,
}

impl AuditEvent {
    pub fn new(kind: AuditKind, actor: Option<String>, detail: impl Into<String>) -> Self {
        AuditEvent {
            id: Uuid::new_v4(),
            kind,
            actor,
            detail: detail.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[async_trait]
pub trait LogServiceTrait: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<Uuid>;
    async fn lookup(&self, id: &Uuid) -> Option<AuditEvent>;
}

pub struct LogService {
    logger: Logger,
    cache: Cache,
}

#[async_trait]
impl LogServiceTrait for LogService {
    async fn record(&self, event: AuditEvent) -> Result<Uuid> {
        let actor = event.actor.clone().unwrap_or_else(|| "anonymous".to_string());
        match event.kind {
            AuditKind::LoginFailed | AuditKind::GuardDenied => {
                warn!(self.logger, "Audit event"; "kind" => %event.kind, "actor" => &actor, "detail" => &event.detail);
            }
            _ => {
                info!(self.logger, "Audit event"; "kind" => %event.kind, "actor" => &actor, "detail" => &event.detail);
            }
        }

        let id = event.id;
        self.cache.insert_as(id.to_string(), &event).await?;
        Ok(id)
    }

    async fn lookup(&self, id: &Uuid) -> Option<AuditEvent> {
        self.cache.get_as(&id.to_string()).await
    }
}

impl LogService {
    pub fn new(cache: Cache) -> Result<Self> {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        let logger = Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")));

        Ok(LogService { logger, cache })
    }

    /// Audit trail that keeps events in memory but writes nothing.
    pub fn discard(cache: Cache) -> Self {
        LogService {
            logger: Logger::root(slog::Discard, o!()),
            cache,
        }
    }
}
