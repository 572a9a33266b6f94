use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    serve, Json, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::Serialize;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::{
    generator::{GenerateRequest, PickupLineGenerator, ValidationError},
    intensity::DEFAULT_LEVEL,
    lines::LineSet,
};

pub const GENERATE_ROUTE: &str = "/api/generate-pickup-lines";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    pickup_lines: LineSet,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Errors surfaced to API callers. Upstream completion failures never end up
/// here; they are answered with fallback lines instead.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("请求格式错误: {0}")]
    MalformedBody(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    generator: Arc<PickupLineGenerator>,
}

impl AppState {
    pub fn new(generator: PickupLineGenerator) -> Self {
        Self::with_template_dir(generator, "templates")
    }

    pub fn with_template_dir(generator: PickupLineGenerator, dir: impl Into<PathBuf>) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(dir.into())),
            generator: Arc::new(generator),
        }
    }
}

fn create_minijinja_env(dir: PathBuf) -> AutoReloader {
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&dir));
        notifier.watch_path(&dir, true);
        Ok(env)
    })
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                tmpl.render(minijinja::context! {
                    title => "土味情话生成器",
                    endpoint => GENERATE_ROUTE,
                    default_intensity => DEFAULT_LEVEL,
                })
            })
        })
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

// Decoded regardless of Content-Type.
async fn generate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request: GenerateRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed generate request");
        ApiError::MalformedBody(e.to_string())
    })?;

    let pickup_lines = state.generator.generate(&request).await.map_err(|e| {
        info!("Rejected generate request: {}", e);
        ApiError::from(e)
    })?;

    Ok(Json(GenerateResponse { pickup_lines }))
}

/// Builds the application router. Exposed separately from
/// [`start_web_server`] so tests can drive it without binding a port.
pub fn router(state: AppState) -> Router {
    let static_files_service = ServeDir::new("static").not_found_service(tower::service_fn(|_req: axum::extract::Request| async {
        Ok::<_, std::convert::Infallible>(
            (StatusCode::NOT_FOUND, Body::from("Not Found")).into_response(),
        )
    }));

    Router::new()
        .route("/", get(index_handler))
        .route(GENERATE_ROUTE, post(generate_handler))
        .nest_service("/static", static_files_service)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn start_web_server(port: u16, generator: PickupLineGenerator) -> Result<()> {
    let app = router(AppState::new(generator));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;
    info!("Web server listening on http://{}", addr);

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")?;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {:?}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl-C received, initiating shutdown...");
}
