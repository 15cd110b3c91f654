// lib/src/http/mod.rs
pub mod api_client;
pub mod transport;

pub use api_client::ApiClient;
pub use transport::{ApiRequest, ApiResponse, ApiTransport, ReqwestTransport};
pub use reqwest::Method;
