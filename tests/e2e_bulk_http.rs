//! End-to-end tests for bulk loading over HTTP
//!
//! These tests run the full producer/assembler/coordinator pipeline against
//! an in-process index store that records every request it receives.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Router,
};
use bulk_core::GenerationConfig;
use bulk_dispatch::{apply_mappings, DispatchCoordinator, HttpTransport, RunState};
use bulk_generator::{DocumentAssembler, Producers};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Requests seen by the mock store
#[derive(Default)]
struct Recorded {
    bulk_bodies: Vec<String>,
    refreshed: Vec<String>,
    mappings: Vec<(String, serde_json::Value)>,
}

#[derive(Clone)]
struct StoreState {
    recorded: Arc<Mutex<Recorded>>,
    bulk_status: StatusCode,
}

async fn bulk(State(state): State<StoreState>, body: Bytes) -> Response {
    state
        .recorded
        .lock()
        .unwrap()
        .bulk_bodies
        .push(String::from_utf8_lossy(&body).into_owned());

    if state.bulk_status.is_success() {
        (state.bulk_status, r#"{"took":5,"errors":false,"items":[]}"#).into_response()
    } else {
        (state.bulk_status, r#"{"error":"store unavailable"}"#).into_response()
    }
}

async fn refresh(State(state): State<StoreState>, Path(indices): Path<String>) -> Response {
    state.recorded.lock().unwrap().refreshed.push(indices);
    (StatusCode::OK, r#"{"_shards":{"failed":0}}"#).into_response()
}

async fn put_mapping(
    State(state): State<StoreState>,
    Path(index): Path<String>,
    body: Bytes,
) -> Response {
    let mapping = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    state.recorded.lock().unwrap().mappings.push((index, mapping));
    (StatusCode::OK, r#"{"acknowledged":true}"#).into_response()
}

/// Start a mock index store answering bulk requests with `bulk_status`
async fn start_store(
    bulk_status: StatusCode,
) -> anyhow::Result<(String, Arc<Mutex<Recorded>>, tokio::task::JoinHandle<()>)> {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    let state = StoreState {
        recorded: recorded.clone(),
        bulk_status,
    };

    let app = Router::new()
        .route("/_bulk", post(bulk))
        .route("/:indices/_refresh", post(refresh))
        .route("/:index", put(put_mapping))
        .with_state(state);

    // Bind to any available port
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let base_url = format!("http://{addr}");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    Ok((base_url, recorded, handle))
}

fn config(url: &str) -> GenerationConfig {
    let yaml = format!(
        r#"
index:
  name: cat
  count: 2
run:
  rounds_per_index: 2
  batch_size: 3
  bulk_size: 10
fields:
  numbers: [currentprice, lastprice]
  strings:
    - name: zonename
      prefix: Zone
    - name: channel
producers:
  seed: 7
target:
  url: "{url}"
"#
    );
    let config = GenerationConfig::from_yaml(&yaml).unwrap();
    config.validate().unwrap();
    config
}

async fn run_pipeline(config: GenerationConfig) -> bulk_dispatch::RunSummary {
    let cancel = CancellationToken::new();
    let transport = Arc::new(HttpTransport::new(&config.target).unwrap());
    let producers = Producers::spawn(&config.producers, cancel.clone());
    let assembler = DocumentAssembler::new(&config, &producers);

    let mut coordinator = DispatchCoordinator::new(config, assembler, transport, cancel.clone());
    let summary = coordinator.run().await;

    cancel.cancel();
    producers.join().await;
    summary
}

#[tokio::test]
async fn test_bulk_load_over_http() -> anyhow::Result<()> {
    let (url, recorded, server) = start_store(StatusCode::OK).await?;

    let summary = run_pipeline(config(&url)).await;

    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.rounds.len(), 4);
    assert_eq!(summary.documents_planned, 120);
    assert_eq!(summary.documents_acknowledged, 120);
    assert_eq!(summary.requests_failed, 0);
    assert_eq!(summary.server_took_ms, 12 * 5);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.bulk_bodies.len(), 12);

    let cat0 = r#"{ "index" : { "_index" : "cat0","_type": "fact"} }"#;
    let cat1 = r#"{ "index" : { "_index" : "cat1","_type": "fact"} }"#;
    for body in &recorded.bulk_bodies {
        assert_eq!(body.matches('\n').count(), 20);
        assert!(body.ends_with('\n'));

        let lines: Vec<&str> = body.lines().collect();
        // A payload never mixes indices
        assert!(lines[0] == cat0 || lines[0] == cat1);
        for pair in lines.chunks(2) {
            assert_eq!(pair[0], lines[0]);
            let doc: serde_json::Value = serde_json::from_str(pair[1])?;
            assert!(doc["currentprice"].is_f64());
            assert!(doc["zonename"].as_str().unwrap().starts_with("Zone "));
            assert_eq!(doc["channel"].as_str().unwrap().len(), 10);
        }
    }
    let cat0_payloads = recorded
        .bulk_bodies
        .iter()
        .filter(|body| body.starts_with(cat0))
        .count();
    assert_eq!(cat0_payloads, 6);

    assert_eq!(recorded.refreshed, vec!["cat0,cat1".to_string()]);

    server.abort();
    Ok(())
}

#[tokio::test]
async fn test_rejected_requests_are_counted() -> anyhow::Result<()> {
    let (url, recorded, server) = start_store(StatusCode::INTERNAL_SERVER_ERROR).await?;

    let mut config = config(&url);
    config.index.count = 1;
    config.run.rounds_per_index = 1;
    config.target.refresh_after = false;

    let summary = run_pipeline(config).await;

    // Transport failures degrade the run but never stop it
    assert_eq!(summary.state, RunState::Done);
    assert_eq!(summary.requests_failed, 3);
    assert_eq!(summary.documents_requested, 30);
    assert_eq!(summary.documents_acknowledged, 0);

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.bulk_bodies.len(), 3);
    assert!(recorded.refreshed.is_empty());

    server.abort();
    Ok(())
}

#[tokio::test]
async fn test_apply_mappings_to_every_index() -> anyhow::Result<()> {
    let (url, recorded, server) = start_store(StatusCode::OK).await?;
    let config = config(&url);
    let transport = HttpTransport::new(&config.target)?;

    apply_mappings(&transport, &config).await?;

    let recorded = recorded.lock().unwrap();
    let indices: Vec<&str> = recorded.mappings.iter().map(|(i, _)| i.as_str()).collect();
    assert_eq!(indices, vec!["cat0", "cat1"]);

    let properties = &recorded.mappings[0].1["mappings"]["fact"]["properties"];
    assert_eq!(properties["zonename"]["fields"]["raw"]["type"], "keyword");
    assert_eq!(properties["channel"]["type"], "text");

    server.abort();
    Ok(())
}
