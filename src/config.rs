use reqwest::header::HeaderName;
use url::Url;

use crate::error::Error;

const DEV_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_REFRESH_PATH: &str = "/api/auth/token/refresh/";
const DEFAULT_SCOPE_HEADER: &str = "x-household-id";

/// Deployment environment, selected by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// `development`, `dev` and `local` select development; anything else,
    /// including an unset variable, is production.
    #[must_use]
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(n)
                if n.eq_ignore_ascii_case("development")
                    || n.eq_ignore_ascii_case("dev")
                    || n.eq_ignore_ascii_case("local") =>
            {
                Self::Development
            }
            _ => Self::Production,
        }
    }

    #[must_use]
    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Resource-server connection settings.
///
/// The base URL is a constructor parameter, so a built config is always
/// usable. Use [`from_env()`](ResourceConfig::from_env) at startup to fail
/// fast when it cannot be resolved.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ResourceConfig {
    pub(crate) base_url: Url,
    pub(crate) refresh_path: String,
    pub(crate) scope_header: HeaderName,
    pub(crate) environment: Environment,
}

impl ResourceConfig {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            refresh_path: DEFAULT_REFRESH_PATH.into(),
            scope_header: HeaderName::from_static(DEFAULT_SCOPE_HEADER),
            environment: Environment::Production,
        }
    }

    /// Create config from environment variables.
    ///
    /// # Env vars
    /// - `APP_ENV`: deployment environment (see [`Environment::from_name`])
    /// - `RESOURCE_API_URL`: resource-server base URL, required outside development
    /// - `RESOURCE_REFRESH_PATH`: override the token refresh path
    /// - `RESOURCE_SCOPE_HEADER`: override the household scope header name
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is missing in a
    /// non-development environment or is not a valid URL, or if the scope
    /// header override is not a valid header name.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env()`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    ///
    /// See [`from_env()`](Self::from_env).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let environment = Environment::from_name(lookup("APP_ENV").as_deref());

        let raw_url = match lookup("RESOURCE_API_URL").filter(|s| !s.trim().is_empty()) {
            Some(url) => url,
            None if environment.is_development() => {
                tracing::warn!(url = DEV_BASE_URL, "RESOURCE_API_URL not set, using development default");
                DEV_BASE_URL.to_string()
            }
            None => {
                return Err(Error::Configuration(
                    "RESOURCE_API_URL is required outside development".into(),
                ));
            }
        };

        let base_url: Url = raw_url
            .trim()
            .parse()
            .map_err(|e| Error::Configuration(format!("RESOURCE_API_URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "RESOURCE_API_URL: {base_url} cannot be used as a base URL"
            )));
        }

        let mut config = Self::new(base_url).with_environment(environment);
        if let Some(path) = lookup("RESOURCE_REFRESH_PATH") {
            config = config.with_refresh_path(path);
        }
        if let Some(header) = lookup("RESOURCE_SCOPE_HEADER") {
            config = config.with_scope_header(&header)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Header carrying the household scope on resource requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `name` is not a valid header name.
    pub fn with_scope_header(mut self, name: &str) -> Result<Self, Error> {
        self.scope_header = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|e| Error::Configuration(format!("scope header {name:?}: {e}")))?;
        Ok(self)
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    #[must_use]
    pub fn scope_header(&self) -> &HeaderName {
        &self.scope_header
    }

    #[must_use]
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Joins a resource path onto the base URL.
    ///
    /// Paths are always resolved from the base URL's own path, so
    /// `https://api.example.com/v1` + `/households/` yields
    /// `https://api.example.com/v1/households/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the joined URL is invalid.
    pub fn resource_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
            .parse()
            .map_err(|e| Error::Configuration(format!("invalid resource path {path:?}: {e}")))
    }
}
