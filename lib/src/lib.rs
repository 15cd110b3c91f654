// lib/src/lib.rs
//! HealthEase portal client core: session, route guard, profile wizards,
//! REST services and the view models built on them.

pub mod config;
pub mod guard;
pub mod http;
pub mod portal;
pub mod services;
pub mod session;
pub mod storage;
pub mod util;
pub mod views;
pub mod wizard;

#[cfg(any(test, feature = "test-suite"))]
pub mod testing;

pub use config::{load_portal_config, PortalConfig};
pub use guard::{GuardDecision, Navigation, Navigator, Route, RouteGuard};
pub use http::{ApiClient, ApiTransport, ReqwestTransport};
pub use portal::Portal;
pub use session::SessionStore;
pub use storage::{DurableStorage, MemoryStorage, SledStorage};
pub use wizard::{Wizard, WizardError, WizardForm};

// Shared model types, so front ends need only this crate.
pub use models::{PortalError, PortalResult, Role, User};
