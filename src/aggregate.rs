//! Page-data aggregation.
//!
//! Every resource is fetched through [`fetch_or_default`], which turns any
//! runtime failure into a resource-specific default. A dashboard therefore
//! always has the same shape no matter how many backend calls failed.
//! Configuration errors are the exception and abort the whole page.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::fetch::ResourceSession;

/// Resource paths making up the dashboard page.
pub mod paths {
    pub const HOUSEHOLDS: &str = "/api/households/";
    pub const ACCOUNTS: &str = "/api/accounts/";
    pub const INCOME_SOURCES: &str = "/api/income-sources/";
    pub const NET_WORTH_SNAPSHOT: &str = "/api/net-worth/snapshot/";
    pub const TAX_SUMMARY: &str = "/api/reports/tax-summary/";
    pub const BASELINE_PROJECTION: &str = "/api/projections/baseline/";
}

/// Fetches `path` and deserializes it into `T`, falling back to `default`.
///
/// Status errors, network failures and unexpected payload shapes all
/// resolve to `default` and are only logged.
///
/// # Errors
///
/// Returns [`Error::Configuration`] unchanged; a broken setup is never
/// passed off as missing data.
pub async fn fetch_or_default<T>(
    session: &ResourceSession<'_>,
    path: &str,
    default: T,
) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    downgrade(path, session.get_as::<T>(path).await, default)
}

fn downgrade<T>(path: &str, result: Result<T, Error>, default: T) -> Result<T, Error> {
    match result {
        Ok(value) => Ok(value),
        Err(e @ Error::Configuration(_)) => {
            tracing::error!(path, error = %e, "Resource request misconfigured");
            Err(e)
        }
        Err(e) => {
            log_downgrade(path, &e);
            Ok(default)
        }
    }
}

fn log_downgrade(path: &str, error: &Error) {
    match error {
        Error::Network(_) => {
            tracing::warn!(path, error = %error, "Resource unreachable, using default");
        }
        Error::AuthenticationFailure { status } => {
            tracing::warn!(path, status, "Resource not authorized, using default");
        }
        _ => {
            tracing::warn!(path, status = ?error.status(), error = %error, "Resource failed, using default");
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload {
    Bare(Vec<Value>),
    Envelope { results: Vec<Value> },
}

/// A list resource, accepted either as a bare array or as a
/// `{ "results": [...] }` envelope and always serialized as a bare array.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "ListPayload")]
pub struct ResourceList(pub Vec<Value>);

impl From<ListPayload> for ResourceList {
    fn from(payload: ListPayload) -> Self {
        match payload {
            ListPayload::Bare(items) | ListPayload::Envelope { results: items } => Self(items),
        }
    }
}

impl Serialize for ResourceList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl ResourceList {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

/// Baseline projection bundle.
///
/// Only present when its own fetch succeeded; consumers render the
/// projection panel based on whether this is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineProjection {
    #[serde(default)]
    pub yearly_results: ResourceList,
    #[serde(default)]
    pub milestones: ResourceList,
    #[serde(flatten)]
    pub summary: Map<String, Value>,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub households: ResourceList,
    pub accounts: ResourceList,
    pub income_sources: ResourceList,
    pub net_worth_snapshot: Option<Value>,
    pub tax_summary: Value,
    pub baseline_projection: Option<BaselineProjection>,
}

fn empty_report() -> Value {
    Value::Object(Map::new())
}

/// Loads all dashboard resources concurrently.
///
/// Each resource that cannot be fetched takes its default (empty list,
/// `null` snapshot, empty report, `null` projection).
///
/// # Errors
///
/// Only [`Error::Configuration`]; every other failure is downgraded.
pub async fn load_dashboard(session: &ResourceSession<'_>) -> Result<DashboardData, Error> {
    let (households, accounts, income_sources, net_worth_snapshot, tax_summary, baseline_projection) = tokio::join!(
        fetch_or_default(session, paths::HOUSEHOLDS, ResourceList::default()),
        fetch_or_default(session, paths::ACCOUNTS, ResourceList::default()),
        fetch_or_default(session, paths::INCOME_SOURCES, ResourceList::default()),
        fetch_or_default(session, paths::NET_WORTH_SNAPSHOT, None::<Value>),
        fetch_or_default(session, paths::TAX_SUMMARY, empty_report()),
        fetch_or_default(session, paths::BASELINE_PROJECTION, None::<BaselineProjection>),
    );

    let tax_summary = tax_summary?;
    Ok(DashboardData {
        households: households?,
        accounts: accounts?,
        income_sources: income_sources?,
        net_worth_snapshot: net_worth_snapshot?,
        tax_summary: if tax_summary.is_null() {
            empty_report()
        } else {
            tax_summary
        },
        baseline_projection: baseline_projection?,
    })
}
