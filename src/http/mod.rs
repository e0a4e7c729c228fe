//! HTTP API for the social graph.
//!
//! JSON-only surface consumed by an external renderer: the combined graph
//! (explicit + derived links), network statistics, and CRUD for people and
//! bonds. No rendering or session state lives here.

use crate::config::Config;
use crate::db::Db;
use crate::error::{BondgraphError, Result};
use crate::graph::{derive_implicit_links, network_stats};
use crate::store::{self, BondInput, PersonInput};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Check if a port is available by attempting to bind to it
async fn check_port_available(port: u16) -> bool {
    tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .is_ok()
}

/// HTTP server wrapper
pub struct HttpServer {
    db: Arc<Db>,
    config: Config,
}

impl HttpServer {
    pub fn new(db: Db, config: Config) -> Self {
        Self {
            db: Arc::new(db),
            config,
        }
    }

    /// Run the HTTP server until shutdown.
    pub async fn run(&self) -> Result<()> {
        let port = self.config.http_server.port;
        let app = self.create_router();

        let addr = format!("127.0.0.1:{}", port);
        log::info!("Starting Bondgraph HTTP server on http://{}", addr);
        log::info!("Graph endpoint: http://{}/api/graph", addr);

        if !check_port_available(port).await {
            return Err(BondgraphError::Config(format!(
                "Port {} is already in use. Another process (possibly a previous bondgraph \
                 instance) is using this port. Stop it or set a different http_server.port \
                 in config.toml.",
                port
            )));
        }

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(BondgraphError::Io)?;

        axum::serve(listener, app).await.map_err(|e| {
            BondgraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }

    /// Create the axum router
    fn create_router(&self) -> Router {
        // CORS: restrict to configured origins when set, otherwise allow any
        // (local dev against a renderer on another port).
        let allowed = &self.config.http_server.allowed_origins;
        let cors = if allowed.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<axum::http::HeaderValue> =
                allowed.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .route("/health", get(handle_health))
            .route("/api/graph", get(handle_graph))
            .route("/api/stats", get(handle_stats))
            .route("/api/people", get(handle_list_people).post(handle_add_person))
            .route(
                "/api/people/:id",
                axum::routing::put(handle_update_person).delete(handle_delete_person),
            )
            .route("/api/bonds", get(handle_list_bonds).post(handle_add_bond))
            .route("/api/bonds/:id", delete(handle_delete_bond))
            .route(
                "/api/maintenance/normalize-types",
                post(handle_normalize_types),
            )
            .route("/api/maintenance/dedupe", post(handle_dedupe))
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
            .with_state(AppState {
                db: Arc::clone(&self.db),
            })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    db: Arc<Db>,
}

/// Map a domain error onto an HTTP response.
fn error_response(err: BondgraphError) -> Response {
    let status = match &err {
        BondgraphError::PersonNotFound(_) | BondgraphError::BondNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        BondgraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

async fn handle_health() -> Response {
    Json(serde_json::json!({
        "status": "ok",
        "service": "bondgraph",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

/// The combined graph: all people plus explicit and derived links.
async fn handle_graph(State(state): State<AppState>) -> Response {
    let people = match store::list_people(&state.db).await {
        Ok(people) => people,
        Err(e) => return error_response(e),
    };
    let bonds = match store::list_bonds(&state.db).await {
        Ok(bonds) => bonds,
        Err(e) => return error_response(e),
    };

    let links = derive_implicit_links(&people, &bonds);
    log::debug!(
        "Graph: {} people, {} explicit bonds, {} links total",
        people.len(),
        bonds.len(),
        links.len()
    );

    Json(serde_json::json!({ "people": people, "links": links })).into_response()
}

async fn handle_stats(State(state): State<AppState>) -> Response {
    let people = match store::list_people(&state.db).await {
        Ok(people) => people,
        Err(e) => return error_response(e),
    };
    let bonds = match store::list_bonds(&state.db).await {
        Ok(bonds) => bonds,
        Err(e) => return error_response(e),
    };

    Json(network_stats(&people, &bonds)).into_response()
}

async fn handle_list_people(State(state): State<AppState>) -> Response {
    match store::list_people(&state.db).await {
        Ok(people) => Json(people).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_add_person(
    State(state): State<AppState>,
    Json(input): Json<PersonInput>,
) -> Response {
    match store::insert_person(&state.db, input).await {
        Ok(person) => (StatusCode::CREATED, Json(person)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_update_person(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PersonInput>,
) -> Response {
    match store::update_person(&state.db, &id, input).await {
        Ok(person) => Json(person).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_delete_person(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match store::delete_person(&state.db, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_list_bonds(State(state): State<AppState>) -> Response {
    match store::list_bonds(&state.db).await {
        Ok(bonds) => Json(bonds).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_add_bond(State(state): State<AppState>, Json(input): Json<BondInput>) -> Response {
    match store::insert_bond(&state.db, input).await {
        Ok(bond) => (StatusCode::CREATED, Json(bond)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_delete_bond(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match store::delete_bond(&state.db, &id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_normalize_types(State(state): State<AppState>) -> Response {
    match store::normalize_legacy_types(&state.db).await {
        Ok(updated) => Json(serde_json::json!({ "updated": updated })).into_response(),
        Err(e) => error_response(e),
    }
}

async fn handle_dedupe(State(state): State<AppState>) -> Response {
    match store::dedupe_bonds(&state.db).await {
        Ok(removed) => Json(serde_json::json!({ "removed": removed })).into_response(),
        Err(e) => error_response(e),
    }
}
