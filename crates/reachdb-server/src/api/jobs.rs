//! Job-control endpoints: start a refresh, read its status or result, and
//! stream progress as server-sent events.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    response::IntoResponse,
    Extension, Json,
};
use futures::StreamExt;
use reachdb_pipeline::{JobResult, JobState, JobStatus, StartOutcome};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StartRefreshData {
    pub status: StartOutcome,
}

/// `POST /api/v1/profiles/{key}/refresh`
pub(super) async fn start_refresh(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Json<ApiResponse<StartRefreshData>> {
    let status = state.service.start(&key);
    tracing::info!(key = %key, ?status, "refresh requested");
    Json(ApiResponse {
        data: StartRefreshData { status },
        meta: ResponseMeta::new(req_id.0),
    })
}

/// `GET /api/v1/profiles/{key}/refresh/status`
pub(super) async fn refresh_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<JobStatus>>, ApiError> {
    match state.service.status(&key) {
        Some(status) => Ok(Json(ApiResponse {
            data: status,
            meta: ResponseMeta::new(req_id.0),
        })),
        None => Err(ApiError::new(
            req_id.0,
            "not_found",
            "no refresh job for this profile key",
        )),
    }
}

/// `GET /api/v1/profiles/{key}/refresh/result`
///
/// A completed run's result is served until the reaper evicts it. A failed
/// run surfaces its failure message verbatim as a 400; anything else — still
/// running, or evicted long ago — is a 404 indistinguishable from a key that
/// was never refreshed.
pub(super) async fn refresh_result(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<JobResult>>, ApiError> {
    if let Some(result) = state.service.result(&key) {
        return Ok(Json(ApiResponse {
            data: (*result).clone(),
            meta: ResponseMeta::new(req_id.0),
        }));
    }

    match state.service.status(&key) {
        Some(status) if status.state == JobState::Failed => {
            Err(ApiError::new(req_id.0, "refresh_failed", status.message))
        }
        _ => Err(ApiError::new(
            req_id.0,
            "not_found",
            "profile not found or still loading",
        )),
    }
}

/// `GET /api/v1/profiles/{key}/refresh/events`
///
/// One `data: <json JobStatus>` frame per second; the stream closes after
/// the terminal status, or immediately for an unknown key.
pub(super) async fn refresh_events(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let stream = state.service.progress_stream(&key).map(|status| {
        Ok::<_, Infallible>(match Event::default().json_data(&status) {
            Ok(event) => event,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize job status for SSE");
                Event::default().data("{}")
            }
        })
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
