//! HTTP server for lead conversion.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                               |
//! |--------|-------------------------|-------------------------------------------|
//! | GET    | `/health`               | Health check                              |
//! | GET    | `/api/mappings`         | Available mapping presets                 |
//! | POST   | `/api/convert`          | Upload CSV, get preview + converted CSV   |
//! | POST   | `/api/convert/download` | Upload CSV, get `converted_file.csv` back |
//! | GET    | `/api/logs`             | SSE stream of conversion messages         |
//!
//! Uploads are `multipart/form-data` with a `file` field and optional
//! `mapping` (preset id) and `encoding` (`utf-8`, `auto` or a label) fields.

use axum::{
    extract::{DefaultBodyLimit, Multipart},
    http::{header, Method},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{ConvertResponse, MappingSummary};
use crate::error::{ServerError, ServerResult};
use crate::parser::InputEncoding;
use crate::transform::mapping::MappingPreset;
use crate::transform::pipeline::{
    convert_bytes, Conversion, ConvertOptions, OUTPUT_FILE_NAME, OUTPUT_MIME,
};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Default listening port
pub const DEFAULT_PORT: u16 = 3000;

/// Build the application router
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/mappings", get(list_mappings))
        .route("/api/convert", post(convert_csv))
        .route("/api/convert/download", post(download_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> ServerResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Leadmap server running on http://localhost:{}", port);
    println!("   POST /api/convert          - Convert CSV (JSON preview)");
    println!("   POST /api/convert/download - Convert CSV (file download)");
    println!("   GET  /api/mappings         - Mapping presets");
    println!("   GET  /api/logs             - SSE log stream");
    println!("   GET  /health               - Health check");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("cannot bind {}: {}", addr, e)))?;
    axum::serve(listener, router())
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "leadmap",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "convert": "POST /api/convert",
            "download": "POST /api/convert/download",
            "mappings": "GET /api/mappings",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn list_mappings() -> Json<Vec<MappingSummary>> {
    Json(MappingPreset::ALL.into_iter().map(MappingSummary::new).collect())
}

async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// A parsed multipart upload
struct Upload {
    bytes: Vec<u8>,
    options: ConvertOptions,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut options = ConvertOptions::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                bytes = Some(data.to_vec());
            }
            "mapping" => {
                let id = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                options.preset = MappingPreset::from_id(&id)
                    .ok_or_else(|| ServerError::BadRequest(format!("Unknown mapping: {}", id)))?;
            }
            "encoding" => {
                let label = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                options.encoding = label
                    .parse::<InputEncoding>()
                    .map_err(|e| ServerError::BadRequest(e.to_string()))?;
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;
    Ok(Upload { bytes, options })
}

fn run_conversion(upload: &Upload) -> ServerResult<Conversion> {
    log_info(format!(
        "📄 New upload: {} bytes, mapping {}",
        upload.bytes.len(),
        upload.options.preset.id()
    ));
    Ok(convert_bytes(&upload.bytes, &upload.options)?)
}

async fn convert_csv(multipart: Multipart) -> ServerResult<Json<ConvertResponse>> {
    let upload = read_upload(multipart).await?;
    let conversion = run_conversion(&upload)?;
    let response = ConvertResponse::build(&conversion, upload.options.preview_rows)
        .map_err(|e| ServerError::Internal(e.to_string()))?;
    Ok(Json(response))
}

async fn download_csv(multipart: Multipart) -> ServerResult<impl IntoResponse> {
    let upload = read_upload(multipart).await?;
    let conversion = run_conversion(&upload)?;
    let bytes = conversion
        .to_csv_bytes()
        .map_err(|e| ServerError::Internal(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, OUTPUT_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", OUTPUT_FILE_NAME),
            ),
        ],
        bytes,
    ))
}
