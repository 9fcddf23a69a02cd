use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{OrgId, ReportId, ReportPatchRequest, ReportSubmission, UserId};
use super::repository::{DirectoryLookup, ReportQuery, ReportRepository, RepositoryError};
use super::service::{ReportServiceError, ReportTriageService};
use super::validate::ValidationError;

/// Router builder exposing the report intake and triage endpoints.
pub fn report_router<R, D, N>(service: Arc<ReportTriageService<R, D, N>>) -> Router
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    Router::new()
        .route(
            "/api/v1/rescue/reports",
            post(create_handler::<R, D, N>).get(list_handler::<R, D, N>),
        )
        .route(
            "/api/v1/rescue/reports/:report_id",
            get(get_handler::<R, D, N>)
                .put(update_handler::<R, D, N>)
                .delete(delete_handler::<R, D, N>),
        )
        .with_state(service)
}

/// Raw listing parameters. Filters arrive as strings and are validated here;
/// unparseable limit/offset values fall back to defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListParams {
    id: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
    search: Option<String>,
    status: Option<String>,
    urgency: Option<String>,
    user_id: Option<String>,
    assigned_ngo_id: Option<String>,
}

impl ListParams {
    fn into_query(self) -> Result<ReportQuery, ValidationError> {
        let status = match self.status {
            Some(raw) => Some(
                super::domain::ReportStatus::parse(&raw)
                    .ok_or(ValidationError::InvalidStatus { value: raw })?,
            ),
            None => None,
        };
        let urgency = match self.urgency {
            Some(raw) => Some(
                super::domain::Urgency::parse(&raw)
                    .ok_or(ValidationError::InvalidUrgency { value: raw })?,
            ),
            None => None,
        };

        Ok(ReportQuery {
            status,
            urgency,
            user_id: self.user_id.map(UserId),
            assigned_ngo_id: self.assigned_ngo_id.map(OrgId),
            search: self.search,
            limit: self.limit.and_then(|raw| raw.trim().parse().ok()),
            offset: self.offset.and_then(|raw| raw.trim().parse().ok()),
        })
    }
}

pub(crate) async fn create_handler<R, D, N>(
    State(service): State<Arc<ReportTriageService<R, D, N>>>,
    axum::Json(submission): axum::Json<ReportSubmission>,
) -> Response
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    match service.create(submission) {
        Ok(report) => (StatusCode::CREATED, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R, D, N>(
    State(service): State<Arc<ReportTriageService<R, D, N>>>,
    Query(params): Query<ListParams>,
) -> Response
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    if let Some(id) = &params.id {
        let id = ReportId(id.clone());
        return match service.get(&id) {
            Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
            Err(error) => error_response(error),
        };
    }

    let query = match params.into_query() {
        Ok(query) => query,
        Err(error) => return error_response(error.into()),
    };

    match service.list(query) {
        Ok(reports) => (StatusCode::OK, axum::Json(reports)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn get_handler<R, D, N>(
    State(service): State<Arc<ReportTriageService<R, D, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    let id = ReportId(report_id);
    match service.get(&id) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R, D, N>(
    State(service): State<Arc<ReportTriageService<R, D, N>>>,
    Path(report_id): Path<String>,
    axum::Json(request): axum::Json<ReportPatchRequest>,
) -> Response
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    let id = ReportId(report_id);
    match service.update(&id, request) {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R, D, N>(
    State(service): State<Arc<ReportTriageService<R, D, N>>>,
    Path(report_id): Path<String>,
) -> Response
where
    R: ReportRepository + 'static,
    D: DirectoryLookup + 'static,
    N: super::notify::NotificationQueue + 'static,
{
    let id = ReportId(report_id);
    match service.delete(&id) {
        Ok(removed) => {
            let payload = json!({
                "message": "rescue report deleted",
                "deletedReport": removed,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

/// Uniform error body: `{error}` everywhere, plus a stable `code` for
/// validation and referential failures so clients can branch on it.
fn error_response(error: ReportServiceError) -> Response {
    match error {
        ReportServiceError::Validation(error) => {
            let payload = json!({
                "error": error.to_string(),
                "code": error.code(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        ReportServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "rescue report not found",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        ReportServiceError::Repository(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
