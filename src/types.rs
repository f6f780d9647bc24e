use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Short-lived bearer credential for resource-server calls.
///
/// `Debug` is redacted so the token never ends up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct AccessToken(String);

/// Long-lived credential exchanged for a fresh [`AccessToken`].
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
#[serde(transparent)]
pub struct RefreshToken(String);

/// Opaque household identifier scoping which data a request can see.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into,
)]
#[serde(transparent)]
pub struct ScopeId(String);

macro_rules! str_newtype {
    ($($ty:ident),*) => {$(
        impl $ty {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// `None` for empty strings, which are treated as absent.
            #[must_use]
            pub fn non_empty(value: impl Into<String>) -> Option<Self> {
                let value = value.into();
                (!value.is_empty()).then_some(Self(value))
            }
        }
    )*};
}

str_newtype!(AccessToken, RefreshToken, ScopeId);

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl std::fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}

/// Credentials handed over by the login flow.
#[derive(Debug, Clone)]
pub struct CredentialPair {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
}

impl CredentialPair {
    #[must_use]
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            refresh_token: None,
        }
    }

    /// Builds a pair from raw login input. Empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredential`] if there is no access token.
    pub fn from_raw(
        access_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Result<Self, Error> {
        let access_token = access_token
            .and_then(AccessToken::non_empty)
            .ok_or(Error::MissingCredential)?;
        Ok(Self {
            access_token,
            refresh_token: refresh_token.and_then(RefreshToken::non_empty),
        })
    }

    #[must_use]
    pub fn with_refresh_token(mut self, refresh_token: RefreshToken) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }
}

/// Credentials read from the inbound request's cookies.
///
/// Every field is optional: an anonymous request simply has none of them.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub scope_id: Option<ScopeId>,
}

impl SessionCredentials {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_access_token(mut self, token: AccessToken) -> Self {
        self.access_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_refresh_token(mut self, token: RefreshToken) -> Self {
        self.refresh_token = Some(token);
        self
    }

    #[must_use]
    pub fn with_scope_id(mut self, scope_id: ScopeId) -> Self {
        self.scope_id = Some(scope_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_tokens() {
        let access = AccessToken::new("secret-access");
        let refresh = RefreshToken::new("secret-refresh");
        assert_eq!(format!("{access:?}"), "AccessToken(***)");
        assert_eq!(format!("{refresh:?}"), "RefreshToken(***)");

        let creds = SessionCredentials::anonymous()
            .with_access_token(access)
            .with_refresh_token(refresh);
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn empty_values_are_absent() {
        assert!(AccessToken::non_empty("").is_none());
        assert_eq!(
            ScopeId::non_empty("h1").map(|s| s.to_string()),
            Some("h1".to_string())
        );
    }

    #[test]
    fn pair_requires_access_token() {
        assert!(matches!(
            CredentialPair::from_raw(None, Some("r1".into())),
            Err(Error::MissingCredential)
        ));
        assert!(matches!(
            CredentialPair::from_raw(Some(String::new()), None),
            Err(Error::MissingCredential)
        ));

        let pair = CredentialPair::from_raw(Some("a1".into()), Some(String::new())).unwrap();
        assert_eq!(pair.access_token.as_str(), "a1");
        assert!(pair.refresh_token.is_none());
    }

    #[test]
    fn tokens_serialize_as_plain_strings() {
        let token = AccessToken::new("abc");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
        let parsed: RefreshToken = serde_json::from_str("\"xyz\"").unwrap();
        assert_eq!(parsed.as_str(), "xyz");
    }

    #[test]
    fn newtypes_prevent_mixing() {
        fn takes_access(_: &AccessToken) {}
        fn takes_refresh(_: &RefreshToken) {}

        let access = AccessToken::from("same".to_string());
        let refresh = RefreshToken::from("same".to_string());

        takes_access(&access);
        takes_refresh(&refresh);
        // takes_access(&refresh);  // Compile error!
    }
}
