use std::sync::OnceLock;

use reqwest::StatusCode;
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::casing::camelize_keys;
use crate::config::ResourceConfig;
use crate::error::Error;
use crate::refresh::TokenRefresher;
use crate::types::{AccessToken, ScopeId, SessionCredentials};

/// Which attempt a resource request is on.
///
/// A request starts as [`Attempt::First`]; an expired access token may move
/// it to [`Attempt::Retried`] once, and there is no state after that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retried,
}

impl Attempt {
    /// The attempt allowed after this one, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::Retried),
            Self::Retried => None,
        }
    }
}

/// Authenticated GET client for the resource server.
///
/// Shared across requests; per-request credentials live in a
/// [`ResourceSession`].
#[derive(Debug, Clone)]
pub struct ResourceClient {
    config: ResourceConfig,
    http: reqwest::Client,
    refresher: TokenRefresher,
}

impl ResourceClient {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the refresh URL cannot be built.
    pub fn new(config: ResourceConfig) -> Result<Self, Error> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the refresh URL cannot be built.
    pub fn with_http_client(config: ResourceConfig, http: reqwest::Client) -> Result<Self, Error> {
        let refresher = TokenRefresher::new(&config, http.clone())?;
        Ok(Self {
            config,
            http,
            refresher,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Binds request credentials to this client.
    #[must_use]
    pub fn session(&self, credentials: SessionCredentials) -> ResourceSession<'_> {
        ResourceSession {
            client: self,
            credentials,
            rotated: OnceLock::new(),
        }
    }

    async fn send(
        &self,
        url: &Url,
        access_token: Option<&AccessToken>,
        scope_id: Option<&ScopeId>,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut request = self
            .http
            .get(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CACHE_CONTROL, "no-store");

        if let Some(token) = access_token {
            request = request.bearer_auth(token.as_str());
        }
        if let Some(scope) = scope_id {
            request = request.header(self.config.scope_header().clone(), scope.as_str());
        }

        request.send().await
    }
}

/// One inbound request's view of the resource server.
///
/// Credentials are read-only for the lifetime of the session. A token
/// obtained through an in-flight refresh is remembered so the caller can
/// decide whether to hand it back to the browser.
#[derive(Debug)]
pub struct ResourceSession<'a> {
    client: &'a ResourceClient,
    credentials: SessionCredentials,
    rotated: OnceLock<AccessToken>,
}

impl ResourceSession<'_> {
    #[must_use]
    pub fn credentials(&self) -> &SessionCredentials {
        &self.credentials
    }

    /// Access token obtained by the first successful in-flight refresh.
    #[must_use]
    pub fn rotated_access_token(&self) -> Option<&AccessToken> {
        self.rotated.get()
    }

    /// Fetches `path` and returns its camelCased JSON payload.
    ///
    /// A 401 on the first attempt triggers one refresh; if that yields a new
    /// access token the request is re-issued once and its outcome is final.
    ///
    /// # Errors
    ///
    /// - [`Error::AuthenticationFailure`] for a final 401 or 403
    /// - [`Error::Resource`] for any other non-success status
    /// - [`Error::Network`] if no response was received
    /// - [`Error::Decode`] if the body is not JSON
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.client.config.resource_url(path)?;
        let scope_id = self.credentials.scope_id.as_ref();
        let mut access_token = self.credentials.access_token.clone();
        let mut attempt = Attempt::First;

        loop {
            let response = self
                .client
                .send(&url, access_token.as_ref(), scope_id)
                .await
                .map_err(|e| {
                    tracing::error!(path, ?attempt, error = %e, "Resource request got no response");
                    Error::Network(e)
                })?;

            if response.status() == StatusCode::UNAUTHORIZED {
                if let Some(next) = attempt.next() {
                    if let Some(token) = self.refresh().await {
                        tracing::debug!(path, "Access token refreshed, retrying once");
                        access_token = Some(token);
                        attempt = next;
                        continue;
                    }
                }
            }

            return read_payload(response, path, attempt).await;
        }
    }

    /// Like [`get()`](Self::get), deserializing the camelCased payload into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`get()`](Self::get).
    pub async fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let payload = self.get(path).await?;
        serde_json::from_value(payload).map_err(Into::into)
    }

    async fn refresh(&self) -> Option<AccessToken> {
        let refresh_token = self.credentials.refresh_token.as_ref()?;
        let token = self.client.refresher.refresh(refresh_token).await?;
        // Concurrent resources may each refresh; the first rotation is kept.
        let _ = self.rotated.set(token.clone());
        Some(token)
    }
}

async fn read_payload(
    response: reqwest::Response,
    path: &str,
    attempt: Attempt,
) -> Result<Value, Error> {
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        tracing::warn!(path, status = status.as_u16(), ?attempt, "Resource request not authorized");
        return Err(Error::AuthenticationFailure {
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        tracing::warn!(path, status = status.as_u16(), "Resource request failed");
        return Err(Error::Resource {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let body = response.bytes().await?;
    if body.is_empty() {
        return Ok(Value::Null);
    }
    let payload: Value = serde_json::from_slice(&body)?;
    Ok(camelize_keys(payload))
}
