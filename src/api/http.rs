use crate::agent::KnowledgeMapAgent;
use crate::api::types::*;
use crate::error::{KnowledgeMapError, Result};
use crate::graph::{load_document, save_document, LoadOutcome};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// HTTP server exposing one shared agent as JSON endpoints
pub struct HttpServer {
    agent: Arc<Mutex<KnowledgeMapAgent>>,
}

impl HttpServer {
    pub fn new(agent: KnowledgeMapAgent) -> Self {
        Self {
            agent: Arc::new(Mutex::new(agent)),
        }
    }

    /// Run the HTTP server until the process is stopped
    pub async fn run(&self, addr: &str) -> Result<()> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::AddrInUse {
                format!(
                    "Address {} is already in use. Stop the other process or pass a different --port.",
                    addr
                )
            } else {
                format!("Failed to bind to {}: {}", addr, e)
            };
            KnowledgeMapError::Server(message)
        })?;

        log::info!("KnowledgeMap HTTP server listening on http://{}", addr);

        axum::serve(listener, app)
            .await
            .map_err(|e| KnowledgeMapError::Server(format!("HTTP server error: {}", e)))?;

        Ok(())
    }

    /// Build the axum router. Every request shares the same agent.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handle_index))
            .route("/health", get(handle_health))
            .route("/api/status", get(handle_status))
            .route("/api/extract", post(handle_extract))
            .route("/api/query", post(handle_query))
            .route("/api/save", post(handle_save))
            .route("/api/load", post(handle_load))
            .layer(
                ServiceBuilder::new()
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                            .on_response(DefaultOnResponse::new().level(Level::INFO)),
                    )
                    .layer(cors),
            )
            .with_state(AppState {
                agent: Arc::clone(&self.agent),
            })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    agent: Arc<Mutex<KnowledgeMapAgent>>,
}

impl AppState {
    /// Lock the agent. Mutations never run while another request holds the lock.
    ///
    /// A request that panicked mid-operation poisons the lock; later requests
    /// keep using the agent rather than failing until restart.
    fn agent(&self) -> MutexGuard<'_, KnowledgeMapAgent> {
        self.agent.lock().unwrap_or_else(|poisoned| {
            log::warn!("Agent lock was poisoned by a failed request, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}

fn client_error(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn internal_error(details: impl std::fmt::Display) -> Response {
    let details = details.to_string();
    log::error!("Request failed: {}", details);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Internal server error",
            "details": details
        })),
    )
        .into_response()
}

/// Parse a JSON body, answering 400 on malformed input
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> std::result::Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| client_error(&format!("Invalid JSON: {}", e)))
}

/// Pull a required non-empty string field out of a request
fn required(value: Option<String>, message: &str) -> std::result::Result<String, Response> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(client_error(message)),
    }
}

async fn handle_index(State(state): State<AppState>) -> Response {
    let name = state.agent().config().name.clone();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "name": name,
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": [
                "GET /api/status",
                "POST /api/extract",
                "POST /api/query",
                "POST /api/save",
                "POST /api/load"
            ]
        })),
    )
        .into_response()
}

async fn handle_health() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "ok",
            "service": "knowledgemap",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
        .into_response()
}

async fn handle_status(State(state): State<AppState>) -> Response {
    let status = state.agent().status();
    (StatusCode::OK, Json(status)).into_response()
}

async fn handle_extract(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    let text = match parse_body::<ExtractRequest>(&body)
        .and_then(|req| required(req.text, "Text must not be empty"))
    {
        Ok(text) => text,
        Err(response) => return response,
    };

    let extraction = state.agent().process_text(&text);

    let response = ExtractResponse {
        success: true,
        entities: extraction.entities.iter().map(EntitySummary::from).collect(),
        relations: extraction
            .relations
            .iter()
            .map(RelationSummary::from)
            .collect(),
        graph: extraction.graph,
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_query(State(state): State<AppState>, body: axum::body::Bytes) -> Response {
    let query = match parse_body::<QueryRequest>(&body)
        .and_then(|req| required(req.query, "Query must not be empty"))
    {
        Ok(query) => query,
        Err(response) => return response,
    };

    let response = state.agent().query_graph(&query);
    (StatusCode::OK, Json(response)).into_response()
}

async fn handle_save(State(state): State<AppState>) -> Response {
    // Snapshot under the lock, write outside it.
    let (path, snapshot) = {
        let agent = state.agent();
        (agent.graph_path().to_path_buf(), agent.graph_snapshot())
    };

    let written =
        tokio::task::spawn_blocking(move || save_document(&path, snapshot.as_ref())).await;

    match written {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(MessageResponse::ok("Knowledge graph saved")),
        )
            .into_response(),
        Ok(Err(e)) => internal_error(e),
        Err(e) => internal_error(e),
    }
}

async fn handle_load(State(state): State<AppState>) -> Response {
    let path = state.agent().graph_path().to_path_buf();

    let outcome = match tokio::task::spawn_blocking(move || load_document(&path)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => return internal_error(e),
        Err(e) => return internal_error(e),
    };

    let message = match outcome {
        LoadOutcome::NotFound => "Graph file not found, state unchanged",
        LoadOutcome::Loaded(_) => "Knowledge graph loaded",
    };

    state.agent().apply_loaded(outcome);

    (StatusCode::OK, Json(MessageResponse::ok(message))).into_response()
}
