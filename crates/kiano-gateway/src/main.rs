//! Kiano Gateway: HTTP front for the property chat engine at 127.0.0.1:8000.
//! Chat widget, channel adapters and operators all talk to this process.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use kiano_core::{CatalogHandle, Channel, ChannelResponse, EngineConfig, ResponseEngine};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CORS_ORIGINS: [&str; 5] = [
    "https://kianolandgroup.com",
    "https://www.kianolandgroup.com",
    "https://kianolandgroup.netlify.app",
    "http://localhost:8000",
    "http://127.0.0.1:3000",
];

/// Process settings read from the environment (`.env` is loaded first).
#[derive(Debug, Clone)]
struct GatewayConfig {
    bind: String,
    port: u16,
    catalog_dir: PathBuf,
    cors_origins: Vec<String>,
}

impl GatewayConfig {
    fn from_env() -> Self {
        let port = env_string("KIANO_PORT")
            .and_then(|p| match p.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!("[CONFIG] KIANO_PORT '{}' is not a port; using 8000", p);
                    None
                }
            })
            .unwrap_or(8000);
        let cors_origins = env_string("KIANO_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect());
        Self {
            bind: env_string("KIANO_BIND").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            catalog_dir: env_string("KIANO_CATALOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            cors_origins,
        }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

struct AppState {
    engine: ResponseEngine,
    catalog_dir: PathBuf,
}

#[derive(Deserialize)]
struct ChatRequest {
    user_input: String,
}

#[derive(Deserialize)]
struct DetectQuery {
    text: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    // Before the subscriber exists so stdout carries only the TOML.
    if std::env::args().any(|a| a == "--print-config") {
        print!("{}", EngineConfig::load()?.to_toml()?);
        return Ok(());
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env();
    let engine_config = EngineConfig::load()?;

    let catalog = CatalogHandle::empty();
    if let Err(e) = catalog.reload_from(&config.catalog_dir) {
        tracing::error!(
            "[GATEWAY] No catalog loaded ({}); answering with the apology until /admin/reload succeeds",
            e
        );
    }

    let state = Arc::new(AppState {
        engine: ResponseEngine::new(catalog, engine_config),
        catalog_dir: config.catalog_dir.clone(),
    });
    let app = build_app(state, &config.cors_origins);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!(
        "[GATEWAY] Kiano Property Bot v{} listening on {}",
        kiano_core::version(),
        config.addr()
    );
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_app(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("[CONFIG] Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/detect-intent", post(detect_intent))
        .route("/admin/reload", post(reload_catalog))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_chat_traffic))
        .layer(cors)
}

async fn log_chat_traffic(request: Request<Body>, next: Next) -> Response {
    tracing::debug!("[GATEWAY] {} {}", request.method(), request.uri().path());
    next.run(request).await
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Kiano Property Bot API is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "online" }))
}

/// Web widget: raw answer plus the web variant split into chat bubbles.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequest>,
) -> Json<serde_json::Value> {
    let answer = state.engine.respond(&body.user_input);
    Json(serde_json::json!({
        "response": {
            "raw": answer.raw,
            "formatted": answer.segments(Channel::Web),
        }
    }))
}

/// Channel adapters: every variant, adapters pick their own.
async fn detect_intent(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DetectQuery>,
) -> Json<ChannelResponse> {
    Json(state.engine.respond(&query.text))
}

/// Re-read the catalog directory. On failure the previous snapshot keeps serving.
async fn reload_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let worker = Arc::clone(&state);
    let catalog = tokio::task::spawn_blocking(move || {
        worker.engine.catalog().reload_from(&worker.catalog_dir)
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(serde_json::json!({
        "intents": catalog.intents().len(),
        "entity_types": catalog.entity_types().len(),
    })))
}
