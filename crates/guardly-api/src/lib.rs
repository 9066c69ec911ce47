// guardly-api: Async Rust client for the AdGuard Home control API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{BasicAuth, DecodedBody, Endpoint, HomeClient};
pub use endpoints::paths;
pub use error::Error;
pub use models::*;
pub use reqwest::Method;
pub use transport::{TlsMode, TransportConfig};
