use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use super::config::BridgeConfig;
use super::cookies;
use super::error::SessionError;
use super::extractor::{SecureTransport, SessionCookies};
use super::state::BridgeState;
use crate::aggregate::{DashboardData, load_dashboard};
use crate::error::Error;
use crate::fetch::ResourceSession;
use crate::types::{CredentialPair, ScopeId};

/// Create the session bridge router.
///
/// Mounts, relative to the configured paths:
/// - `POST {session}/establish`
/// - `POST {session}/terminate`
/// - `GET {session}/verify`
/// - `GET {page_data}/dashboard`
///
/// # Errors
///
/// Returns [`Error::Configuration`] if a mount path does not start with `/`
/// or the resource client cannot be built.
pub fn bridge_routes(config: BridgeConfig) -> Result<Router, Error> {
    config.settings.validate()?;
    let state = BridgeState::new(config)?;
    let session_path = state.settings.session_path.clone();
    let page_data_path = state.settings.page_data_path.clone();

    let router = Router::new()
        .route(&format!("{session_path}/establish"), post(establish))
        .route(&format!("{session_path}/terminate"), post(terminate))
        .route(&format!("{session_path}/verify"), get(verify))
        .route(&format!("{page_data_path}/dashboard"), get(dashboard));

    Ok(router.with_state(state))
}

// ── Establish ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstablishBody {
    token: Option<String>,
    refresh_token: Option<String>,
    scope_id: Option<String>,
}

async fn establish(
    State(state): State<BridgeState>,
    SecureTransport(secure): SecureTransport,
    jar: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, Json<Value>), SessionError> {
    let body: EstablishBody = if body.iter().all(u8::is_ascii_whitespace) {
        EstablishBody::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| SessionError::InvalidBody(e.to_string()))?
    };

    let credentials = CredentialPair::from_raw(body.token, body.refresh_token)?;
    let scope_id = body.scope_id.and_then(ScopeId::non_empty);

    let jar = cookies::establish(jar, &state.settings, &credentials, scope_id.as_ref(), secure);

    tracing::info!(
        has_refresh_token = credentials.refresh_token.is_some(),
        has_scope = scope_id.is_some(),
        secure,
        "Session established"
    );

    Ok((jar, Json(json!({ "success": true }))))
}

// ── Terminate ──────────────────────────────────────────────────────

async fn terminate(
    State(state): State<BridgeState>,
    SecureTransport(secure): SecureTransport,
    jar: CookieJar,
) -> (CookieJar, Json<Value>) {
    let jar = cookies::terminate(jar, &state.settings, secure);
    tracing::info!("Session terminated");
    (jar, Json(json!({ "success": true })))
}

// ── Verify ─────────────────────────────────────────────────────────

async fn verify(
    State(state): State<BridgeState>,
    SecureTransport(secure): SecureTransport,
    SessionCookies(credentials): SessionCookies,
    jar: CookieJar,
) -> Response {
    let session = state.client.session(credentials);

    match session.get(&state.settings.verify_resource_path).await {
        Ok(user) => {
            let jar = with_rotated_cookie(jar, &state, &session, secure);
            (jar, Json(json!({ "success": true, "user": user }))).into_response()
        }
        Err(e) if e.requires_reauthentication() => {
            tracing::info!(error = %e, "Session rejected, clearing cookies");
            let jar = cookies::terminate(jar, &state.settings, secure);
            (jar, SessionError::from(e)).into_response()
        }
        Err(e) => {
            // Transient failure: keep the credentials so the user can retry.
            SessionError::from(e).into_response()
        }
    }
}

// ── Page data ──────────────────────────────────────────────────────

async fn dashboard(
    State(state): State<BridgeState>,
    SecureTransport(secure): SecureTransport,
    SessionCookies(credentials): SessionCookies,
    jar: CookieJar,
) -> Result<(CookieJar, Json<DashboardData>), SessionError> {
    let session = state.client.session(credentials);
    let data = load_dashboard(&session).await?;
    let jar = with_rotated_cookie(jar, &state, &session, secure);
    Ok((jar, Json(data)))
}

// ── Helpers ────────────────────────────────────────────────────────

/// Re-issue the access cookie if a refresh happened during this request and
/// the rewrite is enabled. Otherwise the browser keeps its stale token until
/// the next establish call.
fn with_rotated_cookie(
    jar: CookieJar,
    state: &BridgeState,
    session: &ResourceSession<'_>,
    secure: bool,
) -> CookieJar {
    if !state.settings.rewrite_refreshed_cookie {
        return jar;
    }
    match session.rotated_access_token() {
        Some(token) => {
            tracing::debug!("Re-issuing refreshed access token cookie");
            jar.add(cookies::access_cookie(&state.settings, token, secure))
        }
        None => jar,
    }
}
