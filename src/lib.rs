#![doc = include_str!("../README.md")]

pub mod aggregate;
pub mod casing;
pub mod config;
pub mod error;
pub mod fetch;
#[cfg(feature = "middleware")]
pub mod middleware;
pub mod refresh;
pub mod transport;
pub mod types;

// Re-exports for convenient access
pub use aggregate::{BaselineProjection, DashboardData, ResourceList, fetch_or_default, load_dashboard};
pub use casing::{camelize_keys, to_camel_case};
pub use config::{Environment, ResourceConfig};
pub use error::Error;
pub use fetch::{Attempt, ResourceClient, ResourceSession};
pub use refresh::TokenRefresher;
pub use transport::is_secure_connection;
pub use types::{AccessToken, CredentialPair, RefreshToken, ScopeId, SessionCredentials};
