use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, Multipart, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::DynamicImage;
use rxscan_core::{CanonicalField, CanonicalRecord, ScanError, ValidationVerdict};
use rxscan_logging::{EventLogger, ScanEvent};
use rxscan_pipeline::{ScanOutcome, Scanner};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

pub const SERVICE_NAME: &str = "Prescription QR Code Reader API";

/// Shared application state for API handlers.
pub struct AppState {
    pub scanner: Arc<Scanner<DynamicImage>>,
    pub max_upload_bytes: usize,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    let limit = state.max_upload_bytes;
    Router::new()
        .route("/health", get(health))
        .route("/api/scan-qr", post(scan_qr))
        .route("/api/parse-qr-text", post(parse_qr_text))
        .route("/api/validate-prescription", post(validate_prescription))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON error body: `{ "error": ..., "message": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            error,
            message: message.into(),
        }
    }

    fn bad_request(error: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error, message)
    }

    fn too_large(limit: usize) -> Self {
        Self::new(
            StatusCode::PAYLOAD_TOO_LARGE,
            "File too large",
            format!("File size exceeds {}MB limit", limit / (1024 * 1024)),
        )
    }

    /// Map an extractor rejection (JSON, multipart) onto the JSON error body.
    fn rejected(status: StatusCode, body_text: String, limit: usize) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::too_large(limit);
        }
        Self::bad_request("Invalid request body", body_text)
    }

    fn from_rejection(rejection: JsonRejection, limit: usize) -> Self {
        Self::rejected(rejection.status(), rejection.body_text(), limit)
    }

    fn no_image() -> Self {
        Self::bad_request(
            "No image provided",
            "Please provide an image file or base64 image data",
        )
    }
}

impl From<ScanError> for ApiError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::InvalidImage(message) => Self::bad_request(
                "Invalid base64 image",
                format!("Could not decode base64 image data: {message}"),
            ),
            ScanError::ContractViolation(message) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Contract violation", message)
            }
            other => {
                error!(error = %other, "Error processing QR code");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Processing error",
                    format!("An error occurred while processing the image: {other}"),
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error, "message": self.message }));
        (self.status, body).into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        "Endpoint not found",
        "The requested endpoint does not exist",
    )
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    image: Option<String>,
}

/// Image carried by a scan request: a JSON base64 string or a multipart file.
enum ImageInput {
    Base64(String),
    Upload(Bytes),
}

impl ImageInput {
    fn source(&self) -> &'static str {
        match self {
            Self::Base64(_) => "base64",
            Self::Upload(_) => "file_upload",
        }
    }

    fn decode(&self) -> Result<DynamicImage, ScanError> {
        match self {
            Self::Base64(encoded) => {
                let bytes = STANDARD
                    .decode(rxscan_vision::strip_data_url(encoded))
                    .map_err(|e| ScanError::InvalidImage(e.to_string()))?;
                rxscan_vision::decode_image(&bytes)
            }
            Self::Upload(bytes) => rxscan_vision::decode_image(bytes),
        }
    }
}

/// Pick the image out of a multipart upload or a JSON body.
async fn read_image_input(state: &Arc<AppState>, request: Request) -> Result<ImageInput, ApiError> {
    let limit = state.max_upload_bytes;
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|r| ApiError::rejected(r.status(), r.body_text(), limit))?;
        return read_upload(multipart, limit).await;
    }
    if !content_type.contains("json") {
        return Err(ApiError::no_image());
    }

    let Json(body) = Json::<ScanRequest>::from_request(request, state)
        .await
        .map_err(|r| ApiError::from_rejection(r, limit))?;
    body.image
        .filter(|s| !s.trim().is_empty())
        .map(ImageInput::Base64)
        .ok_or_else(|| {
            ApiError::bad_request(
                "Missing image data",
                "Please provide image data in base64 format",
            )
        })
}

/// The `image` part of a multipart form, if its file name has an image extension.
async fn read_upload(mut multipart: Multipart, limit: usize) -> Result<ImageInput, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::rejected(e.status(), e.body_text(), limit))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let allowed = field
            .file_name()
            .is_some_and(|name| rxscan_vision::is_supported_image(Path::new(name)));
        if !allowed {
            return Err(ApiError::bad_request(
                "Invalid file type",
                "Please upload a valid image file (PNG, JPG, JPEG, GIF, BMP, TIFF, WEBP)",
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::rejected(e.status(), e.body_text(), limit))?;
        return Ok(ImageInput::Upload(bytes));
    }
    Err(ApiError::no_image())
}

async fn scan_qr(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Value>, ApiError> {
    let input = read_image_input(&state, request).await?;
    let image_source = input.source();

    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("scan_qr", request_id = %request_id, image_source);

    let outcome = tokio::task::spawn_blocking({
        let scanner = Arc::clone(&state.scanner);
        let span = span.clone();
        move || -> Result<Option<ScanOutcome>, ScanError> {
            let _entered = span.enter();
            let image = input.decode()?;
            Ok(scanner.scan_outcome(&image))
        }
    })
    .instrument(span)
    .await
    .map_err(|e| ScanError::Other(e.into()))?;

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            EventLogger::log_event(&request_id, ScanEvent::Rejected { reason: err.to_string() });
            return Err(match err {
                ScanError::InvalidImage(message) if image_source == "file_upload" => {
                    ApiError::bad_request(
                        "Invalid image file",
                        format!("Could not decode uploaded image: {message}"),
                    )
                }
                other => other.into(),
            });
        }
    };

    let Some(outcome) = outcome else {
        let env = state.scanner.environment();
        let degraded = !env.can_read_codes();
        EventLogger::log_event(&request_id, ScanEvent::NothingDetected { degraded });
        let message = if degraded {
            format!("Environment degraded: missing {}", env.missing().join(", "))
        } else {
            "No QR code detected in the provided image".to_string()
        };
        return Ok(Json(json!({
            "success": false,
            "qr_detected": false,
            "image_source": image_source,
            "degraded": degraded,
            "message": message,
        })));
    };

    EventLogger::log_event(
        &request_id,
        ScanEvent::Decoded {
            strategy: outcome.strategy.to_string(),
            provenance: outcome.record.provenance().to_string(),
            is_valid: outcome.verdict.is_valid,
            issues: outcome.verdict.issues.iter().map(|i| i.to_string()).collect(),
            payload: outcome.record.raw_payload().to_string(),
        },
    );

    Ok(Json(json!({
        "success": true,
        "qr_detected": true,
        "image_source": image_source,
        "strategy": outcome.strategy,
        "prescription_data": prescription_data(&outcome.record),
        "validation": outcome.verdict,
        "raw_qr_data": outcome.record.raw_payload(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    qr_text: Option<String>,
}

async fn parse_qr_text(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = body.map_err(|r| ApiError::from_rejection(r, state.max_upload_bytes))?;
    let Some(text) = request.qr_text.filter(|s| !s.trim().is_empty()) else {
        return Err(ApiError::bad_request(
            "Missing QR text",
            "Please provide the decoded QR text in qr_text",
        ));
    };

    let record = rxscan_parsing::parse(&text);
    let verdict = rxscan_report::validate(&record);
    EventLogger::log_event(
        &Uuid::new_v4().to_string(),
        ScanEvent::Parsed {
            is_valid: verdict.is_valid,
            issues: verdict.issues.iter().map(|i| i.to_string()).collect(),
            payload: text.clone(),
        },
    );

    Ok(Json(json!({
        "success": true,
        "prescription_data": prescription_data(&record),
        "validation": verdict,
        "formatted": rxscan_report::format(&record),
        "raw_qr_data": text,
    })))
}

async fn validate_prescription(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CanonicalRecord>, JsonRejection>,
) -> Result<Json<ValidationVerdict>, ApiError> {
    let Json(record) = body.map_err(|r| ApiError::from_rejection(r, state.max_upload_bytes))?;
    if record.raw_payload().is_empty() {
        return Err(ScanError::ContractViolation(
            "record has no raw_payload; submit a record produced by a parser".to_string(),
        )
        .into());
    }
    Ok(Json(rxscan_report::validate(&record)))
}

/// All twelve fields, `null` when absent.
fn prescription_data(record: &CanonicalRecord) -> Value {
    let fields: Map<String, Value> = CanonicalField::ALL
        .iter()
        .map(|field| {
            let value = record
                .present(*field)
                .map_or(Value::Null, |v| Value::String(v.to_string()));
            (field.as_str().to_string(), value)
        })
        .collect();
    Value::Object(fields)
}
