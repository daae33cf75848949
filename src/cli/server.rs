//! HTTP server mode for uploading invoice files

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::{Buf, Bytes};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::split::InvoiceSplitter;

/// Multipart field carrying the CSV upload
const FILE_FIELD: &str = "file";

const MISSING_CSV_INPUT_FILE: &str = "Missing csv input file.";
const INVALID_CSV_INPUT_FILE: &str = "Invalid csv input file.";
const UNABLE_TO_PROCESS_THE_REQUEST: &str = "Unable to process the request";

/// App state shared across handlers
#[derive(Clone)]
struct AppState {
    splitter: Arc<InvoiceSplitter>,
}

/// Response wrapper
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// Build the HTTP router around a splitter
pub fn router(splitter: Arc<InvoiceSplitter>, max_upload_bytes: usize) -> Router {
    let state = AppState { splitter };

    // Build CORS layer - allow all origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/csv/split", post(split_invoices))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server
pub async fn serve(config: AppConfig) -> Result<()> {
    let splitter = Arc::new(config.splitter());
    let app = router(splitter, config.server.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::config(format!("Invalid listen address: {e}")))?;
    tracing::info!(
        "Starting HTTP server on http://{} (format: {}, output: {})",
        addr,
        config.output.format,
        config.output.directory.display()
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Split an uploaded CSV file by buyer
async fn split_invoices(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, MISSING_CSV_INPUT_FILE),
        Err(e) => {
            tracing::error!("{INVALID_CSV_INPUT_FILE} {e}");
            return error_response(StatusCode::BAD_REQUEST, INVALID_CSV_INPUT_FILE);
        }
    };

    let splitter = Arc::clone(&state.splitter);
    let result = tokio::task::spawn_blocking(move || splitter.split(upload.reader())).await;

    match result {
        Ok(Ok(report)) => {
            tracing::info!(
                groups = report.groups,
                rows = report.rows_written,
                output_root = %report.output_root.display(),
                "Split upload"
            );
            (StatusCode::OK, Json(ApiResponse::success(report))).into_response()
        }
        Ok(Err(e)) if e.is_invalid_input() => {
            tracing::error!("{INVALID_CSV_INPUT_FILE} {e}");
            error_response(StatusCode::BAD_REQUEST, INVALID_CSV_INPUT_FILE)
        }
        Ok(Err(e)) => {
            tracing::error!("{UNABLE_TO_PROCESS_THE_REQUEST}: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                UNABLE_TO_PROCESS_THE_REQUEST,
            )
        }
        Err(e) => {
            tracing::error!("{UNABLE_TO_PROCESS_THE_REQUEST}: split task failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                UNABLE_TO_PROCESS_THE_REQUEST,
            )
        }
    }
}

/// Read the `file` field of a multipart upload
async fn read_upload(
    multipart: &mut Multipart,
) -> std::result::Result<Option<Bytes>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return field.bytes().await.map(Some);
        }
    }
    Ok(None)
}
