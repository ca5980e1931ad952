//! HTTP surface: `POST /get_data` and `GET /health`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::metrics;
use crate::query::{build, ExecutionError, QueryExecutor, RequestBody, ValidationError};
use crate::storage::Record;

/// Process-scoped state shared by every request
pub struct AppContext {
    pub executor: QueryExecutor,
}

impl AppContext {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }
}

#[derive(Debug, Serialize)]
pub struct GetDataResponse {
    pub msg: String,
    pub status_code: u16,
    pub data: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub msg: String,
    pub status_code: u16,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Execution(ExecutionError::StorageUnavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Execution(ExecutionError::DeadlineExceeded(_)) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Execution(ExecutionError::QueryExecution(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            msg: self.to_string(),
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the router over a shared context
pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/get_data", post(get_data))
        .route("/health", get(health))
        .with_state(context)
}

/// POST /get_data - Runs one query over the dataset
async fn get_data(
    State(context): State<Arc<AppContext>>,
    body: Result<Json<RequestBody>, JsonRejection>,
) -> Result<Json<GetDataResponse>, ApiError> {
    let request = body
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()))
        .and_then(|Json(body)| body.validate())
        .map_err(|err| {
            warn!("Rejected request: {}", err);
            metrics::record_rejected_request();
            err
        })?;

    let statement = build(&request);
    let data = context.executor.execute(&statement).await?;
    info!(rows = data.len(), "Served get_data");

    Ok(Json(GetDataResponse {
        msg: "Ok".to_string(),
        status_code: StatusCode::OK.as_u16(),
        data,
    }))
}

/// GET /health - Checks the store is reachable
async fn health(State(context): State<Arc<AppContext>>) -> Result<&'static str, ApiError> {
    context.executor.ping().await?;
    Ok("OK")
}

/// Serves until Ctrl-C, then lets in-flight requests finish
pub async fn serve(addr: SocketAddr, context: Arc<AppContext>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, router(context))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
