//! Integration tests for entry mutation, navigation, and named operations.

use aweber_api::{
    AweberApi, AweberConfig, ConsumerKey, ConsumerSecret, Entry, HttpError, Resource,
    ResourceError, Session,
};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
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

async fn load_entry(api: &AweberApi, url: &str) -> Entry {
    match api.load_from_url(url).await.unwrap() {
        Resource::Entry(entry) => entry,
        Resource::Collection(_) => panic!("expected {url} to be an entry"),
    }
}

#[tokio::test]
async fn test_save_patches_exactly_the_pending_diff() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "name": "old name",
            "notes": "unchanged",
            "self_link": format!("{base}/accounts/1/lists/2"),
            "resource_type_link": format!("{base}/#list")
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/1.0/accounts/1/lists/2"))
        .and(body_json(json!({"name": "new name"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let api = test_api(&server);
    let mut list = load_entry(&api, "/accounts/1/lists/2").await;

    list.set("name", json!("new name")).unwrap();
    assert!(list.is_dirty());
    list.save().await.unwrap();
    assert!(!list.is_dirty());

    // A clean entry saves without another request; the expect(1) above
    // would trip otherwise.
    list.save().await.unwrap();
}

#[tokio::test]
async fn test_child_collection_is_fetched_once() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1,
            "self_link": format!("{base}/accounts/1"),
            "resource_type_link": format!("{base}/#account")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [],
            "total_size": 7,
            "start": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = test_api(&server);
    let mut account = load_entry(&api, "/accounts/1").await;

    let lists = account.collection("lists").await.unwrap();
    assert_eq!(lists.total_size(), Some(7));

    // Second access serves the cached node
    let lists = account.collection("lists").await.unwrap();
    assert_eq!(lists.total_size(), Some(7));
}

#[tokio::test]
async fn test_move_follows_location_and_refetches() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/1/subscribers/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "email": "joe@example.com",
            "self_link": format!("{base}/accounts/1/lists/1/subscribers/3"),
            "resource_type_link": format!("{base}/#subscriber")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "self_link": format!("{base}/accounts/1/lists/2"),
            "resource_type_link": format!("{base}/#list")
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1.0/accounts/1/lists/1/subscribers/3"))
        .and(body_string_contains("ws.op=move"))
        .and(body_string_contains("list_link="))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header(
                    "Location",
                    format!("{base}/accounts/1/lists/2/subscribers/9").as_str(),
                )
                .set_body_json(json!({"untrusted": "body"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2/subscribers/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "email": "joe@example.com",
            "self_link": format!("{base}/accounts/1/lists/2/subscribers/9"),
            "resource_type_link": format!("{base}/#subscriber")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = test_api(&server);
    let subscriber = load_entry(&api, "/accounts/1/lists/1/subscribers/3").await;
    let target = load_entry(&api, "/accounts/1/lists/2").await;

    let moved = subscriber.move_to(&target, None).await.unwrap();
    assert_eq!(moved.url(), "/accounts/1/lists/2/subscribers/9");
    assert_eq!(moved.resource_type(), Some("subscriber"));
}

#[tokio::test]
async fn test_find_subscribers_merges_total_size() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    // Most specific mocks first: the total-size probe, then the search
    // itself, then the plain entry fetch.
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .and(query_param("ws.show", "total_size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(2)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .and(query_param("ws.op", "findSubscribers"))
        .and(query_param("email", "joe@example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [
                {"id": 3, "self_link": format!("{base}/accounts/1/lists/1/subscribers/3")},
                {"id": 8, "self_link": format!("{base}/accounts/1/lists/4/subscribers/8")}
            ],
            "start": 0
        })))
        .expect(1)
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
    let account = load_entry(&api, "/accounts/1").await;

    let filters = vec![("email".to_string(), "joe@example.com".to_string())];
    let mut results = account.find_subscribers(&filters).await.unwrap();

    assert_eq!(results.total_size(), Some(2));
    assert!(results.url().contains("ws.op=findSubscribers"));
    let first = results.get(0).await.unwrap().unwrap();
    assert_eq!(first.url(), "/accounts/1/lists/1/subscribers/3");
}

#[tokio::test]
async fn test_get_web_forms_returns_entries_from_bare_array() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .and(query_param("ws.op", "getWebForms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "name": "signup",
                "self_link": format!("{base}/accounts/1/lists/1/web_forms/7"),
                "resource_type_link": format!("{base}/#web_form")
            },
            {
                "id": 8,
                "name": "footer",
                "self_link": format!("{base}/accounts/1/lists/2/web_forms/8"),
                "resource_type_link": format!("{base}/#web_form")
            }
        ])))
        .expect(1)
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
    let account = load_entry(&api, "/accounts/1").await;

    let forms = account.get_web_forms().await.unwrap();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].url(), "/accounts/1/lists/1/web_forms/7");
    assert_eq!(forms[1].url(), "/accounts/1/lists/2/web_forms/8");
    assert_eq!(forms[0].resource_type(), Some("web_form"));
}

#[tokio::test]
async fn test_parent_walks_up_two_segments() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "self_link": format!("{base}/accounts/1/lists/2"),
            "resource_type_link": format!("{base}/#list")
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
    let list = load_entry(&api, "/accounts/1/lists/2").await;

    let parent = list.parent().await.unwrap();
    assert_eq!(parent.url(), "/accounts/1");
    assert_eq!(parent.resource_type(), Some("account"));
}

#[tokio::test]
async fn test_parent_is_none_when_fetch_fails() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2,
            "self_link": format!("{base}/accounts/1/lists/2"),
            "resource_type_link": format!("{base}/#list")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"type": "NotFoundError", "message": "gone", "status": 404}
        })))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let list = load_entry(&api, "/accounts/1/lists/2").await;
    assert!(list.parent().await.is_none());
}

#[tokio::test]
async fn test_delete_issues_a_delete_request() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2/subscribers/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "self_link": format!("{base}/accounts/1/lists/2/subscribers/3"),
            "resource_type_link": format!("{base}/#subscriber")
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/1.0/accounts/1/lists/2/subscribers/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let api = test_api(&server);
    let subscriber = load_entry(&api, "/accounts/1/lists/2/subscribers/3").await;
    subscriber.delete().await.unwrap();
}

#[tokio::test]
async fn test_operation_errors_surface_unchanged() {
    let server = MockServer::start().await;
    let base = format!("{}/1.0", server.uri());

    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2/subscribers/3"))
        .and(query_param("ws.op", "getActivity"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"type": "RateLimitError", "message": "Slow down", "status": 403}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/accounts/1/lists/2/subscribers/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "self_link": format!("{base}/accounts/1/lists/2/subscribers/3"),
            "resource_type_link": format!("{base}/#subscriber")
        })))
        .mount(&server)
        .await;

    let api = test_api(&server);
    let subscriber = load_entry(&api, "/accounts/1/lists/2/subscribers/3").await;

    let error = subscriber.get_activity().await.unwrap_err();
    let ResourceError::Http(HttpError::Api(api_error)) = error else {
        panic!("expected a structured API error")
    };
    assert_eq!(api_error.error_type, "RateLimitError");
}
