//! API handlers for the review server
//!
//! Provides REST endpoints for:
//! - Document upload (multipart)
//! - Grammar and AI compliance assessment
//! - AI rewriting into a new document
//! - Download and record metadata

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::{
    AssessmentReport, DocumentFormat, DocumentId, DocumentRecord, DocumentStatus,
};
use tracing::{debug, info};

use crate::error::ServerError;
use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub documents: usize,
    pub grammar_backend: &'static str,
    pub ai_configured: bool,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = state.service.engine();
    Json(HealthResponse {
        status: "healthy",
        service: "docreview-server",
        version: env!("CARGO_PKG_VERSION"),
        documents: state.service.registry().len().await,
        grammar_backend: engine.grammar_backend(),
        ai_configured: engine.ai_configured(),
    })
}

/// Parse a path or body id; anything that is not a UUID is an unknown document
pub fn parse_id(raw: &str) -> Result<DocumentId, ServerError> {
    raw.parse()
        .map_err(|_| ServerError::NotFound("Document not found".to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: DocumentId,
    pub filename: String,
    pub detail: String,
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::InvalidRequest(err.body_text())
    }
}

/// Handler: POST /upload
///
/// Multipart fields: `file` (required) and `guidelines` (optional text).
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ServerError> {
    let mut multipart = multipart.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut guidelines: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("guidelines") => {
                guidelines = Some(field.text().await.map_err(multipart_error)?);
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| {
        ServerError::InvalidRequest("Invalid form data or file missing".to_string())
    })?;

    let record = state.service.upload(&file_name, &bytes, guidelines).await?;
    info!(document_id = %record.id, filename = %record.display_name, "Upload accepted");

    Ok(Json(UploadResponse {
        id: record.id,
        filename: record.display_name,
        detail: "Upload successful".to_string(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssessResponse {
    pub id: DocumentId,
    pub filename: String,
    pub report: AssessmentReport,
}

/// Handler: POST /assess/:id
pub async fn handle_assess(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AssessResponse>, ServerError> {
    let id = parse_id(&id)?;
    let (record, report) = state.service.assess(&id).await?;

    Ok(Json(AssessResponse {
        id: record.id,
        filename: record.display_name,
        report,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ModifyRequest {
    pub doc_id: String,
    pub instruction: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModifyResponse {
    pub modified_id: DocumentId,
    pub download_path: String,
    pub filename: String,
}

/// Handler: POST /modify
pub async fn handle_modify(
    State(state): State<AppState>,
    payload: Result<Json<ModifyRequest>, JsonRejection>,
) -> Result<Json<ModifyResponse>, ServerError> {
    let Json(request) = payload
        .map_err(|e| ServerError::InvalidRequest(format!("Invalid JSON body: {}", e.body_text())))?;
    let id = parse_id(&request.doc_id)?;

    let derived = state.service.modify(&id, &request.instruction).await?;

    Ok(Json(ModifyResponse {
        modified_id: derived.id,
        download_path: format!("/download/{}", derived.id),
        filename: derived.display_name,
    }))
}

/// Handler: GET /download/:id
pub async fn handle_download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, [(String, String); 2], Vec<u8>), ServerError> {
    let id = parse_id(&id)?;
    let download = state.service.open_download(&id).await?;

    Ok((
        StatusCode::OK,
        [
            ("Content-Type".to_string(), download.content_type),
            (
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{}\"", download.record.display_name),
            ),
        ],
        download.bytes,
    ))
}

/// Record metadata, without the report body or storage location
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub id: DocumentId,
    pub filename: String,
    pub status: DocumentStatus,
    pub origin_id: Option<DocumentId>,
    pub source_format: DocumentFormat,
    pub guidelines: Option<String>,
    pub has_report: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DocumentRecord> for DocumentInfo {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            filename: record.display_name,
            status: record.status,
            origin_id: record.origin_id,
            source_format: record.source_format,
            guidelines: record.guidelines,
            has_report: record.last_report.is_some(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Handler: GET /documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DocumentInfo>, ServerError> {
    let id = parse_id(&id)?;
    let record = state.service.registry().get(&id).await?;
    Ok(Json(record.into()))
}
