//! Integration tests for the search endpoint family using wiremock.
//!
//! Exercises the full create → poll → fetch-results workflow, content
//! negotiation for CSV results, Range-windowed result pages, and the
//! errors-are-data behavior for rejected queries.

use std::time::Duration;

use qradar_client::client::ApiClient;
use qradar_client::config::ClientConfig;
use qradar_client::error::ApiError;
use qradar_client::paging::PageWindow;
use qradar_client::search::{Search, SearchApi, SearchOptions};
use qradar_client::task::PollConfig;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_client(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new("unused").api_token("mock-token");
    ApiClient::with_base_url(config, &format!("{}/api/", server.uri())).unwrap()
}

fn fast_poll() -> PollConfig {
    PollConfig::new(Duration::from_millis(50), Duration::from_secs(10))
}

fn search_body(status: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "search_id": "sid-1",
        "status": status,
        "progress": if status == "COMPLETED" { 100 } else { 40 },
        "record_count": if status == "COMPLETED" { 12 } else { 0 }
    }))
}

#[tokio::test]
async fn search_workflow_end_to_end() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    // Step 1: submit the query.
    Mock::given(method("POST"))
        .and(path("/api/ariel/searches"))
        .and(query_param("query_expression", "SELECT sourceip FROM events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "search_id": "sid-1",
            "status": "WAIT"
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Step 2: status progression WAIT → SORTING → COMPLETED.
    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-1"))
        .respond_with(search_body("WAIT"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-1"))
        .respond_with(search_body("SORTING"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-1"))
        .respond_with(search_body("COMPLETED"))
        .mount(&server)
        .await;

    // Step 3: one JSON result window.
    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-1/results"))
        .and(header("Accept", "application/json"))
        .and(header("Range", "items=0-4"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "events": [
                        {"sourceip": "10.0.0.1"},
                        {"sourceip": "10.0.0.2"},
                        {"sourceip": "10.0.0.3"},
                        {"sourceip": "10.0.0.4"},
                        {"sourceip": "10.0.0.5"}
                    ]
                }))
                .insert_header("Content-Range", "items 0-4/12"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let created = searches
        .create_search("SELECT sourceip FROM events", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
    let search: Search = created.json().unwrap();
    assert_eq!(search.search_id, "sid-1");

    let terminal = searches
        .wait_for_completion(&search.search_id, &fast_poll())
        .await
        .unwrap();
    assert_eq!(terminal, "COMPLETED");

    let results = searches
        .results(&search.search_id, "application/json", Some(PageWindow::new(0, 5)))
        .await
        .unwrap();
    assert!(results.is_success());
    let body: serde_json::Value = results.json().unwrap();
    assert_eq!(body["events"].as_array().unwrap().len(), 5);
    assert_eq!(results.content_range().unwrap().total, 12);
}

#[tokio::test]
async fn create_search_passes_optional_parameters() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("POST"))
        .and(path("/api/ariel/searches"))
        .and(query_param("query_expression", "SELECT * FROM flows"))
        .and(query_param("query_language_version", "2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "search_id": "sid-2",
            "status": "WAIT"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = SearchOptions {
        query_language_version: Some("2".to_string()),
        ..Default::default()
    };
    let created = searches
        .create_search("SELECT * FROM flows", &options)
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 201);
}

#[tokio::test]
async fn faulty_query_is_returned_as_data() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("POST"))
        .and(path("/api/ariel/searches"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "code": 2000,
            "message": "Error in SELECT clause: unknown column 'sourcip'"
        })))
        .mount(&server)
        .await;

    let created = searches
        .create_search("SELECT sourcip FROM events", &SearchOptions::default())
        .await
        .unwrap();
    assert_eq!(created.status().as_u16(), 422);
    assert!(created.text().contains("SELECT clause"));
}

#[tokio::test]
async fn csv_results_via_content_negotiation() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-1/results"))
        .and(header("Accept", "application/csv"))
        .respond_with(ResponseTemplate::new(200).set_body_string("sourceip\n10.0.0.1\n10.0.0.2\n"))
        .expect(1)
        .mount(&server)
        .await;

    let results = searches
        .results("sid-1", "application/csv", None)
        .await
        .unwrap();
    assert!(results.text().starts_with("sourceip\n"));
}

#[tokio::test]
async fn save_results_posts_the_flag() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("POST"))
        .and(path("/api/ariel/searches/sid-1"))
        .and(query_param("save_results", "true"))
        .respond_with(search_body("COMPLETED"))
        .expect(1)
        .mount(&server)
        .await;

    let response = searches.save_results("sid-1").await.unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn delete_search_issues_a_delete() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("DELETE"))
        .and(path("/api/ariel/searches/sid-1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
            "search_id": "sid-1",
            "status": "CANCELED"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = searches.delete_search("sid-1").await.unwrap();
    assert_eq!(response.status().as_u16(), 202);
}

#[tokio::test]
async fn failed_search_surfaces_the_terminal_status() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("GET"))
        .and(path("/api/ariel/searches/sid-bad"))
        .respond_with(search_body("ERROR"))
        .mount(&server)
        .await;

    let err = searches
        .wait_for_completion("sid-bad", &fast_poll())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::TaskFailed { status } if status == "ERROR"));
}

#[tokio::test]
async fn databases_lists_available_sources() {
    let server = MockServer::start().await;
    let client = mock_client(&server);
    let searches = SearchApi::new(&client);

    Mock::given(method("GET"))
        .and(path("/api/ariel/databases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!(["events", "flows"])))
        .expect(1)
        .mount(&server)
        .await;

    let response = searches.databases().await.unwrap();
    let names: Vec<String> = response.json().unwrap();
    assert_eq!(names, vec!["events", "flows"]);
}
