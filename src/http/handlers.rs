use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;
use crate::consts::DEFAULT_LIST_LIMIT;
use crate::error::{ReportError, Result};
use crate::export;
use crate::report::{ReportId, ReportRecord, ReportRequest};

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "model": state.service.model(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// POST /api/reports
///
/// Body-level problems (not JSON, wrong types) are validation errors, the
/// same as a missing company.
pub async fn create_report(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ReportRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<ReportRecord>>)> {
    let Json(request) = payload.map_err(|e| ReportError::Validation(e.body_text()))?;
    let record = state.service.create_report(request).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// GET /api/reports?limit=N
pub async fn list_reports(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<DataResponse<Vec<ReportRecord>>>> {
    let Query(params) = params.map_err(|e| ReportError::Validation(e.body_text()))?;
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let records = state.service.list_reports(limit).await?;
    Ok(Json(DataResponse { data: records }))
}

/// GET /api/reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<ReportRecord>>> {
    let id = parse_id(&id)?;
    let record = state.service.get_report(&id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// GET /api/reports/{id}/export
pub async fn export_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&id)?;
    let record = state.service.get_report(&id).await?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "text/markdown; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export::file_name(&record)),
        ),
    ];
    Ok((headers, export::to_markdown(&record)))
}

/// An id that is not even a UUID cannot name a stored report.
fn parse_id(raw: &str) -> Result<ReportId> {
    raw.parse()
        .map_err(|_| ReportError::NotFound(raw.to_string()))
}
