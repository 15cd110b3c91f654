// lib/src/guard/mod.rs
//! Role-scoped navigation: the guard predicate and the route tree it protects.

pub mod navigator;
pub mod route_guard;

pub use navigator::{Navigation, Navigator, Route};
pub use route_guard::{login_location, GuardDecision, RouteGuard};
