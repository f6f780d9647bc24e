use std::sync::Arc;

use super::config::{BridgeConfig, SessionSettings};
use crate::error::Error;
use crate::fetch::ResourceClient;

/// Shared state for bridge route handlers.
#[derive(Clone)]
pub struct BridgeState {
    pub(super) client: Arc<ResourceClient>,
    pub(super) settings: SessionSettings,
}

impl BridgeState {
    pub(super) fn new(config: BridgeConfig) -> Result<Self, Error> {
        let client = match config.http {
            Some(http) => ResourceClient::with_http_client(config.resource, http)?,
            None => ResourceClient::new(config.resource)?,
        };

        Ok(Self {
            client: Arc::new(client),
            settings: config.settings,
        })
    }
}
