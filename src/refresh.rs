use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ResourceConfig;
use crate::error::Error;
use crate::types::{AccessToken, RefreshToken};

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
}

/// Exchanges refresh tokens for new access tokens.
///
/// Failures are reported as `None` and never retried here. The refresher
/// knows nothing about resource fetching, so a refresh can never trigger
/// another refresh.
#[derive(Debug, Clone)]
pub struct TokenRefresher {
    http: reqwest::Client,
    refresh_url: Url,
}

impl TokenRefresher {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the refresh URL cannot be built.
    pub fn new(config: &ResourceConfig, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            refresh_url: config.resource_url(config.refresh_path())?,
        })
    }

    #[must_use]
    pub fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }

    /// Performs one refresh call.
    ///
    /// Returns `None` for an empty token, a network failure, a non-success
    /// status, or a response without an `access` field.
    pub async fn refresh(&self, refresh_token: &RefreshToken) -> Option<AccessToken> {
        if refresh_token.as_str().is_empty() {
            return None;
        }

        let response = match self
            .http
            .post(self.refresh_url.clone())
            .json(&RefreshRequest {
                refresh: refresh_token.as_str(),
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Token refresh request got no response");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Token refresh rejected");
            return None;
        }

        match response.json::<RefreshResponse>().await {
            Ok(body) => body.access.and_then(AccessToken::non_empty),
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh returned an unreadable body");
                None
            }
        }
    }
}
