use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rxmatrix::api::{create_router, AppState};
use rxmatrix::config::{ClientConfig, Config, GatewayConfig, ServerConfig};
use rxmatrix::models::{PairKey, Severity};
use rxmatrix::view::CellState;

mod common;
use common::http_session;

async fn mock_rxnav() -> MockServer {
    let rxnav = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/REST/approximateTerm.json"))
        .and(query_param("term", "warfarin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "approximateGroup": {"candidate": [{"rxcui": "11289", "name": "warfarin"}]}
        })))
        .mount(&rxnav)
        .await;
    Mock::given(method("GET"))
        .and(path("/REST/approximateTerm.json"))
        .and(query_param("term", "aspirin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "approximateGroup": {"candidate": [{"rxcui": "1191", "name": "aspirin"}]}
        })))
        .mount(&rxnav)
        .await;
    Mock::given(method("GET"))
        .and(path("/REST/interaction/list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fullInteractionTypeGroup": [{
                "sourceName": "ONCHigh",
                "fullInteractionType": [{
                    "comment": "Warfarin with antiplatelet agents.",
                    "interactionPair": [{
                        "severity": "high",
                        "description": "Increased risk of bleeding."
                    }]
                }]
            }]
        })))
        .mount(&rxnav)
        .await;
    rxnav
}

/// Serves the gateway on an ephemeral port and returns its base URL.
async fn spawn_gateway(rxnav: &MockServer) -> String {
    let config = Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        client: ClientConfig::default(),
        gateway: GatewayConfig {
            rxnav_base_url: rxnav.uri(),
            request_timeout_secs: 5,
            max_suggestions: 5,
            cache_size: 32,
        },
    };
    let app = create_router(AppState::new(config).expect("state"));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn session_against_gateway_resolves_major_interaction() {
    let rxnav = mock_rxnav().await;
    let base_url = spawn_gateway(&rxnav).await;
    let mut session = http_session(&base_url);

    for query in ["warfarin", "aspirin"] {
        session.search_query_changed(query);
        let item = session.await_suggestions().await[0].clone();
        session.item_chosen(item);
    }
    session.settle().await;

    let key = PairKey::new("rxcui:11289", "rxcui:1191");
    assert_eq!(
        session.matrix().state_of(&key),
        Some(CellState::Interaction(Severity::Major))
    );

    let detail = session.cell_clicked(&key).expect("detail");
    assert_eq!(detail.title, "Aspirin + Warfarin");
    assert_eq!(detail.guidance, "Increased risk of bleeding.");
    assert_eq!(
        detail.mechanism.as_deref(),
        Some("Warfarin with antiplatelet agents.")
    );
    assert!(detail
        .sources
        .iter()
        .any(|s| s.name == "MedlinePlus Connect" && s.url.contains("11289")));
}

#[tokio::test]
async fn gateway_health_endpoint() {
    let rxnav = MockServer::start().await;
    let base_url = spawn_gateway(&rxnav).await;

    let body: serde_json::Value = reqwest::get(format!("{base_url}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["rxnavBaseUrl"], rxnav.uri());
}
