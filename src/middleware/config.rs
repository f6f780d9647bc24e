use time::Duration;

use crate::config::ResourceConfig;
use crate::error::Error;

/// Cookie and route settings shared by config and runtime state.
#[derive(Debug, Clone)]
pub(crate) struct SessionSettings {
    pub(crate) access_cookie_name: String,
    pub(crate) refresh_cookie_name: String,
    pub(crate) scope_cookie_name: String,
    pub(crate) access_cookie_ttl: Duration,
    pub(crate) refresh_cookie_ttl: Duration,
    pub(crate) scope_cookie_ttl: Duration,
    pub(crate) session_path: String,
    pub(crate) page_data_path: String,
    pub(crate) verify_resource_path: String,
    pub(crate) rewrite_refreshed_cookie: bool,
}

impl SessionSettings {
    pub(crate) fn defaults() -> Self {
        Self {
            access_cookie_name: "access_token".into(),
            refresh_cookie_name: "refresh_token".into(),
            scope_cookie_name: "household_id".into(),
            // Outlives the token itself so an expired token is still seen
            // (and refreshed) instead of the request turning anonymous.
            access_cookie_ttl: Duration::hours(2),
            refresh_cookie_ttl: Duration::days(7),
            scope_cookie_ttl: Duration::days(7),
            session_path: "/api/session".into(),
            page_data_path: "/api/page-data".into(),
            verify_resource_path: "/api/auth/me/".into(),
            rewrite_refreshed_cookie: false,
        }
    }

    /// Checks the mount points before they reach the router.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        for (name, path) in [
            ("session path", &self.session_path),
            ("page data path", &self.page_data_path),
        ] {
            if !path.is_empty() && !path.starts_with('/') {
                return Err(Error::Configuration(format!(
                    "{name} {path:?} must start with '/'"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn cookie_names(&self) -> [&str; 3] {
        [
            self.access_cookie_name.as_str(),
            self.refresh_cookie_name.as_str(),
            self.scope_cookie_name.as_str(),
        ]
    }
}

/// Session bridge configuration.
///
/// The resource-server config is a constructor parameter, so the base URL
/// has already been validated by the time routes are built.
///
/// Use [`from_env()`](BridgeConfig::from_env) for convention-based setup,
/// or [`new()`](BridgeConfig::new) with `with_*` methods for full control.
pub struct BridgeConfig {
    pub(super) resource: ResourceConfig,
    pub(super) settings: SessionSettings,
    pub(super) http: Option<reqwest::Client>,
}

impl BridgeConfig {
    #[must_use]
    pub fn new(resource: ResourceConfig) -> Self {
        Self {
            resource,
            settings: SessionSettings::defaults(),
            http: None,
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads everything [`ResourceConfig::from_env`] reads, plus:
    /// - `SESSION_PATH`: mount point of the session routes (default `/api/session`)
    /// - `PAGE_DATA_PATH`: mount point of the page-data routes (default `/api/page-data`)
    /// - `REFRESH_COOKIE_REWRITE`: `"1"` or `"true"` to re-issue the access
    ///   cookie after an in-flight refresh
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the resource server cannot be
    /// resolved or a mount path does not start with `/`.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::new(ResourceConfig::from_env()?);

        if let Ok(path) = std::env::var("SESSION_PATH") {
            config = config.with_session_path(path);
        }
        if let Ok(path) = std::env::var("PAGE_DATA_PATH") {
            config = config.with_page_data_path(path);
        }
        let rewrite = matches!(
            std::env::var("REFRESH_COOKIE_REWRITE").as_deref(),
            Ok("1") | Ok("true"),
        );

        config.settings.validate()?;
        Ok(config.with_refresh_cookie_rewrite(rewrite))
    }

    /// Use a custom HTTP client for resource-server calls.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    #[must_use]
    pub fn with_access_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.access_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_refresh_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.refresh_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_scope_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.scope_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_access_cookie_ttl(mut self, ttl: Duration) -> Self {
        self.settings.access_cookie_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_cookie_ttl(mut self, ttl: Duration) -> Self {
        self.settings.refresh_cookie_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_scope_cookie_ttl(mut self, ttl: Duration) -> Self {
        self.settings.scope_cookie_ttl = ttl;
        self
    }

    /// Mount point of the session routes. Must start with `/`; checked when
    /// the router is built.
    #[must_use]
    pub fn with_session_path(mut self, path: impl Into<String>) -> Self {
        self.settings.session_path = mount_path(path.into());
        self
    }

    /// Mount point of the page-data routes. Same rules as
    /// [`with_session_path()`](Self::with_session_path).
    #[must_use]
    pub fn with_page_data_path(mut self, path: impl Into<String>) -> Self {
        self.settings.page_data_path = mount_path(path.into());
        self
    }

    /// Resource fetched by the session verification route.
    #[must_use]
    pub fn with_verify_resource_path(mut self, path: impl Into<String>) -> Self {
        self.settings.verify_resource_path = path.into();
        self
    }

    #[must_use]
    pub fn with_refresh_cookie_rewrite(mut self, enabled: bool) -> Self {
        self.settings.rewrite_refreshed_cookie = enabled;
        self
    }
}

fn mount_path(path: String) -> String {
    path.trim().trim_end_matches('/').to_string()
}
