//! Freshness-governed profile reads and growth history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use reachdb_core::{GrowthPoint, Snapshot};
use reachdb_pipeline::{JobStatus, ProfileView, StartOutcome};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_store_error, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ProfileData {
    pub snapshot: Snapshot,
    pub stale: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct RefreshKickoffData {
    pub status: StartOutcome,
    pub job: Option<JobStatus>,
}

/// `GET /api/v1/profiles/{key}`
///
/// Serves the latest snapshot when it is younger than the freshness window —
/// without touching the provider. Otherwise a background refresh is kicked
/// off (or joined, if one is already active) and the response is a 202 with
/// the current job status.
pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Response {
    match state.service.profile_view(&key).await {
        Ok(ProfileView::Fresh(snapshot)) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: ProfileData {
                    snapshot,
                    stale: false,
                },
                meta: ResponseMeta::new(req_id.0),
            }),
        )
            .into_response(),
        Ok(ProfileView::Refreshing(status)) => {
            let job = state.service.status(&key);
            (
                StatusCode::ACCEPTED,
                Json(ApiResponse {
                    data: RefreshKickoffData { status, job },
                    meta: ResponseMeta::new(req_id.0),
                }),
            )
                .into_response()
        }
        Err(e) => map_store_error(req_id.0, &e).into_response(),
    }
}

/// `GET /api/v1/profiles/{key}/growth`
pub(super) async fn get_growth(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(key): Path<String>,
) -> Response {
    match state.service.growth(&key).await {
        Ok(series) => (
            StatusCode::OK,
            Json(ApiResponse::<Vec<GrowthPoint>> {
                data: series,
                meta: ResponseMeta::new(req_id.0),
            }),
        )
            .into_response(),
        Err(e) => map_store_error(req_id.0, &e).into_response(),
    }
}
