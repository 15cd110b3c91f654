// lib/src/session/mod.rs
pub mod session_store;

pub use session_store::{SessionStore, CURRENT_USER_KEY, TOKEN_KEY};
