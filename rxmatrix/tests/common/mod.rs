#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rxmatrix::client::{ApiConfig, InteractionClient, MatrixApiClient, NormalizationClient};
use rxmatrix::config::ClientConfig;
use rxmatrix::session::Session;

/// Client settings pointing at `base_url` with a short search debounce.
pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_string(),
        request_timeout_secs: 5,
        search_debounce_ms: 10,
        ..ClientConfig::default()
    }
}

/// A session wired to the HTTP clients for `base_url`.
pub fn http_session(base_url: &str) -> Session {
    let config = client_config(base_url);
    let api = MatrixApiClient::new(ApiConfig::from(&config)).expect("api client");
    Session::new(
        Arc::new(NormalizationClient::new(api.clone()).with_max_results(config.max_suggestions)),
        Arc::new(InteractionClient::new(api)),
        &config,
    )
}

pub fn item_json(id: &str, display: &str) -> Value {
    json!({"id": id, "display": display, "type": "Drug"})
}

pub async fn mount_normalize(server: &MockServer, query: &str, items: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/normalize"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "canonical": items })))
        .mount(server)
        .await;
}

pub async fn mount_interaction(server: &MockServer, a: &str, b: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/api/interactions"))
        .and(query_param("a", a))
        .and(query_param("b", b))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
