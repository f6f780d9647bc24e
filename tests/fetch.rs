mod common;

use common::{FakeServer, REFRESH_PATH, Reply, closed_addr};
use household_bridge::{
    AccessToken, Error, RefreshToken, ResourceClient, ResourceConfig, ScopeId, SessionCredentials,
};
use serde_json::{Value, json};

const HOUSEHOLDS: &str = "/api/households/";

fn logged_in(access: &str, refresh: Option<&str>) -> SessionCredentials {
    let creds = SessionCredentials::anonymous().with_access_token(AccessToken::new(access));
    match refresh {
        Some(r) => creds.with_refresh_token(RefreshToken::new(r)),
        None => creds,
    }
}

#[tokio::test]
async fn household_envelope_is_camelized() {
    let server = FakeServer::start(vec![(
        HOUSEHOLDS,
        Reply::Fixed(
            200,
            json!({ "results": [{ "id": "h1", "tax_filing_status": "married_joint" }] }),
        ),
    )])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("a1", None).with_scope_id(ScopeId::new("h1")));

    let list: household_bridge::ResourceList = session.get_as(HOUSEHOLDS).await.unwrap();
    assert_eq!(
        serde_json::to_value(&list).unwrap(),
        json!([{ "id": "h1", "taxFilingStatus": "married_joint" }])
    );

    let hits = server.hits(HOUSEHOLDS);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer a1"));
    assert_eq!(hits[0].scope.as_deref(), Some("h1"));
    assert_eq!(hits[0].cache_control.as_deref(), Some("no-store"));
}

#[tokio::test]
async fn anonymous_request_sends_no_credentials() {
    let server = FakeServer::start(vec![(HOUSEHOLDS, Reply::Fixed(200, json!([])))]).await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(SessionCredentials::anonymous());

    assert_eq!(session.get(HOUSEHOLDS).await.unwrap(), json!([]));

    let hits = server.hits(HOUSEHOLDS);
    assert!(hits[0].authorization.is_none());
    assert!(hits[0].scope.is_none());
}

#[tokio::test]
async fn expired_token_is_refreshed_and_retried_once() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::RequireToken("fresh", json!([{ "id": "h1" }]))),
        (REFRESH_PATH, Reply::Fixed(200, json!({ "access": "fresh" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("stale", Some("r1")));

    let payload = session.get(HOUSEHOLDS).await.unwrap();
    assert_eq!(payload, json!([{ "id": "h1" }]));

    let hits = server.hits(HOUSEHOLDS);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer stale"));
    assert_eq!(hits[1].authorization.as_deref(), Some("Bearer fresh"));

    let refreshes = server.hits(REFRESH_PATH);
    assert_eq!(refreshes.len(), 1);
    let sent: Value = serde_json::from_slice(&refreshes[0].body).unwrap();
    assert_eq!(sent, json!({ "refresh": "r1" }));

    assert_eq!(session.rotated_access_token().map(|t| t.as_str()), Some("fresh"));
}

#[tokio::test]
async fn second_unauthorized_is_final() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::Fixed(401, json!({ "detail": "expired" }))),
        (REFRESH_PATH, Reply::Fixed(200, json!({ "access": "fresh" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("stale", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure { status: 401 }));
    assert_eq!(server.hits(HOUSEHOLDS).len(), 2);
    assert_eq!(server.hits(REFRESH_PATH).len(), 1);
}

#[tokio::test]
async fn failed_refresh_surfaces_original_401() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::Fixed(401, json!({}))),
        (REFRESH_PATH, Reply::Fixed(401, json!({ "detail": "token_not_valid" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("stale", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(err.requires_reauthentication());
    assert_eq!(server.hits(HOUSEHOLDS).len(), 1);
    assert_eq!(server.hits(REFRESH_PATH).len(), 1);
    assert!(session.rotated_access_token().is_none());
}

#[tokio::test]
async fn refresh_without_access_field_is_a_failure() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::Fixed(401, json!({}))),
        (REFRESH_PATH, Reply::Fixed(200, json!({ "refresh": "r2" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("stale", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure { .. }));
    assert_eq!(server.hits(HOUSEHOLDS).len(), 1);
}

#[tokio::test]
async fn missing_refresh_token_fails_immediately() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::Fixed(401, json!({}))),
        (REFRESH_PATH, Reply::Fixed(200, json!({ "access": "fresh" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("stale", None));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure { status: 401 }));
    assert_eq!(server.hits(HOUSEHOLDS).len(), 1);
    assert!(server.hits(REFRESH_PATH).is_empty());
}

#[tokio::test]
async fn forbidden_is_auth_failure_without_refresh() {
    let server = FakeServer::start(vec![
        (HOUSEHOLDS, Reply::Fixed(403, json!({}))),
        (REFRESH_PATH, Reply::Fixed(200, json!({ "access": "fresh" }))),
    ])
    .await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("a1", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(matches!(err, Error::AuthenticationFailure { status: 403 }));
    assert!(server.hits(REFRESH_PATH).is_empty());
}

#[tokio::test]
async fn server_error_is_resource_error() {
    let server = FakeServer::start(vec![(HOUSEHOLDS, Reply::Fixed(500, json!({})))]).await;
    let client = ResourceClient::new(server.config()).unwrap();
    let session = client.session(logged_in("a1", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    match err {
        Error::Resource {
            status,
            status_text,
        } => {
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("expected resource error, got {other:?}"),
    }
    assert!(server.hits(REFRESH_PATH).is_empty());
}

#[tokio::test]
async fn unreachable_server_is_network_failure() {
    let addr = closed_addr().await;
    let config = ResourceConfig::new(format!("http://{addr}").parse().unwrap());
    let client = ResourceClient::new(config).unwrap();
    let session = client.session(logged_in("a1", Some("r1")));

    let err = session.get(HOUSEHOLDS).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_retryable());
    assert!(!err.requires_reauthentication());
}
