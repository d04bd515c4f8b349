use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use recs_core::api::ConsoleApi;
use recs_core::record::RecordId;
use recs_core::search::{FilterField, SearchCriteria};
use recs_core::session::Credentials;
use recs_interaction::HttpConsoleApi;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api(server: &MockServer) -> HttpConsoleApi {
    HttpConsoleApi::new(server.uri(), None).unwrap()
}

fn january_first() -> SearchCriteria {
    SearchCriteria::with_range(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_login_posts_form_and_returns_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=s3cret"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-1", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = api(&server)
        .login(&Credentials::new("alice", "s3cret"))
        .await
        .unwrap();
    assert_eq!(token.access_token, "tok-1");
    assert_eq!(token.token_type.as_deref(), Some("bearer"));
}

#[tokio::test]
async fn test_login_422_maps_to_credentials_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "username"], "msg": "field required"}]
        })))
        .mount(&server)
        .await;

    let err = api(&server)
        .login(&Credentials::new("", ""))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.login_message(),
        "Please fill in both the username and password fields."
    );
}

#[tokio::test]
async fn test_login_401_surfaces_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let err = api(&server)
        .login(&Credentials::new("alice", "wrong"))
        .await
        .unwrap_err();
    assert_eq!(err.login_message(), "Incorrect username or password");
}

#[tokio::test]
async fn test_records_query_omits_empty_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/records"))
        .and(header("Authorization", "Bearer tok-1"))
        .and(query_param("start_date", "1704067200"))
        .and(query_param("end_date", "1704153600"))
        .and(query_param("user_id", "u-1"))
        .and(query_param_is_missing("phone"))
        .and(query_param_is_missing("voicemail"))
        .and(query_param_is_missing("cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": 1, "originationTime": 1704070000, "clusterId": "c1", "userId": "u-1",
             "devices": {"phone": "555-0100"}},
            {"_id": "2", "originationTime": 1704080000, "userId": "u-1", "devices": {}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut criteria = january_first();
    criteria.set_filter(FilterField::UserId, "u-1");

    let records = api(&server).fetch_records("tok-1", &criteria).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].devices.phone.as_deref(), Some("555-0100"));
    assert_eq!(records[1].id, RecordId::Text("2".to_string()));
}

#[tokio::test]
async fn test_records_401_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let err = api(&server)
        .fetch_records("expired", &january_first())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Invalid token");
}

#[tokio::test]
async fn test_records_404_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/records"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "No records found for the given parameters"})),
        )
        .mount(&server)
        .await;

    let err = api(&server)
        .fetch_records("tok-1", &january_first())
        .await
        .unwrap_err();
    assert!(!err.is_unauthorized());
    assert_eq!(err.user_message(), "No records found for the given parameters");
}

#[tokio::test]
async fn test_audit_logs_are_fetched_with_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/audit-logs"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "path": "/token", "method": "POST", "status_code": 200,
             "timestamp": "2024-05-01T10:15:30.123456", "client_ip": "127.0.0.1",
             "user_agent": "recs"}
        ])))
        .mount(&server)
        .await;

    let entries = api(&server).fetch_audit_logs("tok-1").await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].path, "/token");
}

#[tokio::test]
async fn test_validate_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/validate-token"))
        .and(header("Authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/validate-token"))
        .and(header("Authorization", "Bearer bad"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let api = api(&server);
    api.validate_token("good").await.unwrap();
    assert!(api.validate_token("bad").await.unwrap_err().is_unauthorized());
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on the discard port.
    let api = HttpConsoleApi::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
    let err = api.fetch_audit_logs("tok").await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.user_message(), "An error occurred");
}
