//! Router-level tests for the JSON API

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use knowledgemap::api::HttpServer;
use knowledgemap::{AgentConfig, KnowledgeMapAgent};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_router(temp_dir: &TempDir) -> Router {
    let agent = KnowledgeMapAgent::new(
        AgentConfig::default(),
        temp_dir.path().join("knowledge_graph.json"),
    );
    HttpServer::new(agent).router()
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health_and_index() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);

    let (status, body) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&router, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "KnowledgeMap Agent");
}

#[tokio::test]
async fn test_status_initially_empty() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);

    let (status, body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_count"], 0);
    assert_eq!(body["relation_count"], 0);
    assert_eq!(body["graph_built"], false);
    assert_eq!(body["model"], "claude-3.7-sonnet");
}

#[tokio::test]
async fn test_extract_returns_entities_relations_graph() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);

    let (status, body) = send(&router, "POST", "/api/extract", Some(r#"{"text": "A B C"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let entities = body["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 3);
    assert_eq!(entities[0], json!({"id": "entity_1", "name": "人工智能", "type": "技术"}));

    let relations = body["relations"].as_array().unwrap();
    assert_eq!(relations.len(), 1);
    assert_eq!(relations[0]["source"], "entity_1");
    assert_eq!(relations[0]["target"], "entity_2");
    assert_eq!(relations[0]["type"], "相关");

    assert_eq!(body["graph"]["nodes"].as_array().unwrap().len(), 3);
    assert_eq!(body["graph"]["edges"].as_array().unwrap().len(), 1);
    assert_eq!(body["graph"]["metadata"]["entity_count"], 3);

    let (_, status_body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status_body["graph_status"], "已构建");
}

#[tokio::test]
async fn test_extract_rejects_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);

    let (status, body) = send(&router, "POST", "/api/extract", Some(r#"{"text": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&router, "POST", "/api/extract", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&router, "POST", "/api/extract", Some("{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid JSON"));
}

#[tokio::test]
async fn test_query_routes_by_keyword() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);
    send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;

    let (status, body) = send(&router, "POST", "/api/query", Some(r#"{"query": "Entity list"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "Entity list");
    assert_eq!(body["results"].as_array().unwrap().len(), 3);

    let (_, body) = send(&router, "POST", "/api/query", Some(r#"{"query": "所有关系"}"#)).await;
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"][0]["relation_type"], "相关");

    let (_, body) = send(&router, "POST", "/api/query", Some(r#"{"query": "overview"}"#)).await;
    assert_eq!(body["results"]["nodes"].as_array().unwrap().len(), 3);

    let (status, _) = send(&router, "POST", "/api/query", Some(r#"{"query": ""}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);
    send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;

    let (status, body) = send(&router, "POST", "/api/save", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(temp_dir.path().join("knowledge_graph.json").exists());

    // A second extraction is discarded by the load.
    send(&router, "POST", "/api/extract", Some(r#"{"text": "more"}"#)).await;
    let (_, status_body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status_body["entity_count"], 6);

    let (status, body) = send(&router, "POST", "/api/load", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Knowledge graph loaded");

    let (_, status_body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status_body["entity_count"], 3);
    assert_eq!(status_body["relation_count"], 1);
}

#[tokio::test]
async fn test_load_missing_file_is_not_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);
    send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;

    let (status, body) = send(&router, "POST", "/api/load", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("not found"));

    let (_, status_body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status_body["entity_count"], 3);
}

#[tokio::test]
async fn test_load_corrupt_file_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("knowledge_graph.json"), "{ broken").unwrap();
    let router = test_router(&temp_dir);

    let (status, body) = send(&router, "POST", "/api/load", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("JSON"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_saves_all_succeed() {
    let temp_dir = TempDir::new().unwrap();
    let router = test_router(&temp_dir);
    send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;

    for _ in 0..5 {
        let saves: Vec<_> = (0..8)
            .map(|_| {
                let router = router.clone();
                tokio::spawn(async move { send(&router, "POST", "/api/save", None).await })
            })
            .collect();

        for save in saves {
            let (status, body) = save.await.unwrap();
            assert_eq!(status, StatusCode::OK, "save failed: {}", body);
        }
    }

    let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(entries, 1);

    let (status, body) = send(&router, "POST", "/api/load", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Knowledge graph loaded");
}

#[tokio::test]
async fn test_extract_after_loading_max_suffix_ids() {
    let temp_dir = TempDir::new().unwrap();
    let graph = json!({
        "nodes": [{
            "id": format!("entity_{}", u64::MAX),
            "name": "边界",
            "type": "技术",
            "properties": {}
        }],
        "edges": [],
        "metadata": {
            "created_at": "2024-01-01T00:00:00Z",
            "entity_count": 1,
            "relation_count": 0
        }
    });
    std::fs::write(
        temp_dir.path().join("knowledge_graph.json"),
        serde_json::to_string_pretty(&graph).unwrap(),
    )
    .unwrap();
    let router = test_router(&temp_dir);

    let (status, _) = send(&router, "POST", "/api/load", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entities"][0]["id"], "entity_1");

    let (status, body) = send(&router, "POST", "/api/query", Some(r#"{"query": "entity"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_save_failure_is_server_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir(temp_dir.path().join("knowledge_graph.json")).unwrap();
    let router = test_router(&temp_dir);
    send(&router, "POST", "/api/extract", Some(r#"{"text": "text"}"#)).await;

    let (status, body) = send(&router, "POST", "/api/save", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert!(body["details"].as_str().unwrap().contains("IO error"));

    let (status, body) = send(&router, "GET", "/api/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_count"], 3);
}
