//! Axum routes bridging login credentials into HTTP-only cookies and
//! serving aggregated page data.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use household_bridge::middleware::{BridgeConfig, bridge_routes};
//!
//! // 1. Configure from environment (fails fast without RESOURCE_API_URL in production)
//! let config = BridgeConfig::from_env()?;
//!
//! // 2. Mount the routes
//! let app = axum::Router::new().merge(bridge_routes(config)?);
//! ```
//!
//! The login flow posts `{ token, refreshToken?, scopeId? }` to
//! `/api/session/establish`; logout posts to `/api/session/terminate`.

mod config;
mod cookies;
mod error;
mod extractor;
mod routes;
mod state;

pub use config::BridgeConfig;
pub use error::SessionError;
pub use extractor::SecureTransport;
pub use routes::bridge_routes;

/// Re-export of the TTL type used by the cookie builder API.
pub use time::Duration as CookieTtl;
