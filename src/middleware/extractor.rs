use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, HeaderName};
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use super::config::SessionSettings;
use super::cookies;
use super::state::BridgeState;
use crate::transport::{FORWARDED_PROTO, is_secure_connection};
use crate::types::{AccessToken, RefreshToken, ScopeId, SessionCredentials};

/// Credentials carried by the inbound request.
///
/// Never rejects: a request without cookies yields anonymous credentials.
/// The household scope falls back to the scope header when no scope cookie
/// is present.
#[derive(Debug, Clone)]
pub struct SessionCookies(pub SessionCredentials);

impl FromRequestParts<BridgeState> for SessionCookies {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &BridgeState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Self(read_credentials(
            &jar,
            &parts.headers,
            &state.settings,
            state.client.config().scope_header(),
        )))
    }
}

pub(super) fn read_credentials(
    jar: &CookieJar,
    headers: &HeaderMap,
    settings: &SessionSettings,
    scope_header: &HeaderName,
) -> SessionCredentials {
    let scope_id = cookies::get_value(jar, &settings.scope_cookie_name)
        .or_else(|| {
            headers
                .get(scope_header)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.trim().to_string())
        })
        .and_then(ScopeId::non_empty);

    SessionCredentials {
        access_token: cookies::get_value(jar, &settings.access_cookie_name).map(AccessToken::new),
        refresh_token: cookies::get_value(jar, &settings.refresh_cookie_name)
            .map(RefreshToken::new),
        scope_id,
    }
}

/// Whether cookies written on this request may be marked `Secure`.
///
/// Secure when `X-Forwarded-Proto` is `https`, or when the request URI is
/// absolute and starts with `https://`. HTTP/1.1 requests normally carry an
/// origin-form URI (`/api/...`), so a server terminating TLS itself without
/// a proxy header is seen as insecure; deploy behind a proxy that sets
/// `X-Forwarded-Proto`.
#[derive(Debug, Clone, Copy)]
pub struct SecureTransport(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for SecureTransport {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get(FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok());
        Ok(Self(is_secure_connection(forwarded, &parts.uri.to_string())))
    }
}
