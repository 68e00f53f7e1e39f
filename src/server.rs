use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use indicatif::ProgressBar;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::ServiceError;
use crate::service::{self, ScrapeRequest, ScrapeResponse};
use crate::settings::Settings;

#[derive(Clone)]
struct AppState {
    settings: Arc<Settings>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

pub fn router(settings: Settings) -> Router {
    let state = AppState {
        settings: Arc::new(settings),
    };
    Router::new()
        .route("/api/health", get(health))
        .route("/api/scrape", post(scrape_handler).options(preflight))
        .layer(middleware::map_response(allow_any_origin))
        .with_state(state)
}

pub async fn serve(settings: Settings, bind: &str) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {}", bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(settings))
        .await
        .context("server shutdown")?;
    Ok(())
}

async fn allow_any_origin(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    response
}

async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health() -> Json<serde_json::Value> {
    info!("Health check requested");
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn scrape_handler(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, (StatusCode, Json<ErrorBody>)> {
    let settings = Arc::clone(&state.settings);
    let result = tokio::task::spawn_blocking(move || {
        service::invoke_with_settings(&settings, &request, &ProgressBar::hidden())
    })
    .await
    .map_err(|err| ServiceError::Internal(anyhow!("scrape task join error: {err}")))
    .and_then(|r| r);

    match result {
        Ok(response) => {
            info!(
                "Scraped {} products, saved to {}",
                response.count, response.csv_file
            );
            Ok(Json(response))
        }
        Err(err) => Err(error_response(err)),
    }
}

fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NoRecords => StatusCode::NOT_FOUND,
        ServiceError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ServiceError) -> (StatusCode, Json<ErrorBody>) {
    let status = status_for(&err);
    if status.is_server_error() {
        error!("Error during scraping: {:#}", err);
    } else {
        warn!("Scrape request rejected ({}): {}", status, err);
    }
    (
        status,
        Json(ErrorBody {
            detail: err.to_string(),
        }),
    )
}
