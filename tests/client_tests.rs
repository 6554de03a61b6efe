//! Integration tests for the top-level API surface against a mock server.

use aweber_api::{AweberApi, AweberConfig, ConsumerKey, ConsumerSecret, HttpError, Resource, ResourceError, Session};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_api(server: &MockServer) -> AweberApi {
    let config = AweberConfig::builder()
        .consumer_key(ConsumerKey::new("consumer-key").unwrap())
        .consumer_secret(ConsumerSecret::new("consumer-secret").unwrap())
        .base_url(format!("{}/1.0", server.uri()))
        .build()
        .unwrap();
    AweberApi::new(&config, Session::new("access-token", "token-secret"))
}

#[tokio::test]
async fn test_account_returns_first_account_entry() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [{
                "id": 1,
                "self_link": format!("{base}/accounts/1"),
                "resource_type_link": format!("{base}/#account")
            }],
            "total_size": 1,
            "start": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = test_api(&server);
    let account = api.account().await.unwrap();
    assert_eq!(account.url(), "/accounts/1");
    assert_eq!(account.resource_type(), Some("account"));
}

#[tokio::test]
async fn test_account_errors_when_collection_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [],
            "total_size": 0,
            "start": 0
        })))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let error = api.account().await.unwrap_err();
    assert!(matches!(error, ResourceError::UnexpectedShape { .. }));
}

#[tokio::test]
async fn test_load_from_url_classifies_collections_and_entries() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [],
            "total_size": 0,
            "start": 0
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "self_link": format!("{base}/accounts/1"),
            "resource_type_link": format!("{base}/#account")
        })))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let lists = api.load_from_url("/accounts/1/lists").await.unwrap();
    assert!(matches!(lists, Resource::Collection(_)));

    // Absolute URLs under the base are accepted too
    let account = api
        .load_from_url(&format!("{base}/accounts/1"))
        .await
        .unwrap();
    let Resource::Entry(account) = account else {
        panic!("expected an entry")
    };
    assert_eq!(account.url(), "/accounts/1");
}

#[tokio::test]
async fn test_structured_api_errors_surface_with_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {
                "type": "NotFoundError",
                "message": "URL endpoint not found",
                "status": 404
            }
        })))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let error = api.load_from_url("/accounts/99").await.unwrap_err();
    let ResourceError::Http(HttpError::Api(api_error)) = error else {
        panic!("expected a structured API error")
    };
    assert_eq!(api_error.error_type, "NotFoundError");
    assert_eq!(api_error.message, "URL endpoint not found");
    assert_eq!(api_error.status, Some(404));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let error = api.account().await.unwrap_err();
    assert!(matches!(
        error,
        ResourceError::Http(HttpError::Malformed { .. })
    ));
}
