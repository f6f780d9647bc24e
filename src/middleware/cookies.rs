use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

use super::config::SessionSettings;
use crate::types::{AccessToken, CredentialPair, ScopeId};

/// Create a credential cookie.
pub(super) fn credential_cookie(
    name: &str,
    value: &str,
    max_age: Duration,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

/// Create an emptied cookie that makes the browser discard `name`.
pub(super) fn cleared_cookie(name: &str, secure: bool) -> Cookie<'static> {
    credential_cookie(name, "", Duration::ZERO, secure)
}

/// Write the session cookies for a fresh login.
///
/// The refresh and scope cookies are only written when provided; existing
/// ones are left as they are.
pub(super) fn establish(
    jar: CookieJar,
    settings: &SessionSettings,
    credentials: &CredentialPair,
    scope_id: Option<&ScopeId>,
    secure: bool,
) -> CookieJar {
    let mut jar = jar.add(access_cookie(settings, &credentials.access_token, secure));

    if let Some(refresh) = &credentials.refresh_token {
        jar = jar.add(credential_cookie(
            &settings.refresh_cookie_name,
            refresh.as_str(),
            settings.refresh_cookie_ttl,
            secure,
        ));
    }

    if let Some(scope) = scope_id {
        jar = jar.add(credential_cookie(
            &settings.scope_cookie_name,
            scope.as_str(),
            settings.scope_cookie_ttl,
            secure,
        ));
    }

    jar
}

/// Clear all three session cookies, present or not.
pub(super) fn terminate(jar: CookieJar, settings: &SessionSettings, secure: bool) -> CookieJar {
    settings
        .cookie_names()
        .into_iter()
        .fold(jar, |jar, name| jar.add(cleared_cookie(name, secure)))
}

/// Create the access-token cookie.
pub(super) fn access_cookie(
    settings: &SessionSettings,
    token: &AccessToken,
    secure: bool,
) -> Cookie<'static> {
    credential_cookie(
        &settings.access_cookie_name,
        token.as_str(),
        settings.access_cookie_ttl,
        secure,
    )
}

/// Read a cookie value, treating an empty value as absent.
pub(super) fn get_value(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
