//! 후보 API 라우트
//!
//! - `POST /candidates` - 수동 생성 (201)
//! - `GET /candidates?universe_id=&status=` - 목록 (as_of, score 내림차순)
//! - `PATCH /candidates/{id}/status` - 운영자 상태 변경
//! - `POST /candidates/generate` - 템플릿으로 후보 생성

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chronos_core::{CandidateStatus, NewCandidate, Ticker, TradeCandidate};
use chronos_strategy::CandidateError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::universes::require_universe;
use crate::error::{api_error, not_found, validate_request, ApiResult};
use crate::state::AppState;

/// 후보 수동 생성 요청
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCandidateRequest {
    pub universe_id: i64,
    pub template_id: i64,
    #[validate(length(min = 1, max = 20, message = "티커는 1-20자여야 합니다"))]
    pub ticker: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub payload_json: Option<serde_json::Value>,
}

/// 후보 목록 쿼리
#[derive(Debug, Deserialize, Validate)]
pub struct CandidateListQuery {
    #[validate(range(min = 1, message = "universe_id는 1 이상이어야 합니다"))]
    pub universe_id: i64,
    #[serde(default)]
    pub status: Option<CandidateStatus>,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500, message = "limit은 1-500 사이여야 합니다"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset은 0 이상이어야 합니다"))]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

/// 상태 변경 요청
#[derive(Debug, Deserialize)]
pub struct CandidateStatusUpdate {
    pub status: CandidateStatus,
    #[serde(default)]
    pub reason_code: Option<String>,
}

/// 후보 생성 요청
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub universe_id: i64,
    pub template_id: i64,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

/// 후보 생성 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub universe_id: i64,
    pub template_id: i64,
    pub candidates_created: usize,
}

/// POST /candidates
async fn create_candidate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCandidateRequest>,
) -> ApiResult<(StatusCode, Json<TradeCandidate>)> {
    validate_request(&request)?;
    require_universe(&state, request.universe_id).await?;
    if state
        .store
        .get_template(request.template_id)
        .await
        .map_err(api_error)?
        .is_none()
    {
        return Err(not_found("template not found"));
    }

    let new = NewCandidate {
        universe_id: request.universe_id,
        template_id: request.template_id,
        ticker: Ticker::parse(&request.ticker).map_err(api_error)?.into_inner(),
        score: request.score,
        status: request.status,
        reason_code: request.reason_code,
        payload_json: request
            .payload_json
            .unwrap_or_else(|| serde_json::json!({})),
    };

    let created = state
        .store
        .insert_candidates(std::slice::from_ref(&new))
        .await
        .map_err(api_error)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            api_error(chronos_core::ChronosError::Internal(
                "candidate insert returned no rows".to_string(),
            ))
        })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /candidates
async fn list_candidates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CandidateListQuery>,
) -> ApiResult<Json<Vec<TradeCandidate>>> {
    validate_request(&query)?;

    let candidates = state
        .store
        .list_candidates(query.universe_id, query.status, query.limit, query.offset)
        .await
        .map_err(api_error)?;
    Ok(Json(candidates))
}

/// PATCH /candidates/{id}/status
async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<CandidateStatusUpdate>,
) -> ApiResult<Json<TradeCandidate>> {
    let updated = state
        .store
        .update_candidate_status(id, request.status, request.reason_code)
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("candidate not found"))?;

    info!(candidate_id = id, status = %updated.status, "후보 상태 변경");
    Ok(Json(updated))
}

/// POST /candidates/generate
async fn generate_candidates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    if state
        .store
        .get_universe(request.universe_id)
        .await
        .map_err(api_error)?
        .is_none()
    {
        return Err(api_error(CandidateError::UniverseNotFound(
            request.universe_id,
        )));
    }

    let provider = state.provider_or_default(request.provider);
    let interval = state.interval_or_default(request.interval);

    let created = state
        .candidate_engine()
        .generate(request.universe_id, request.template_id, &provider, &interval)
        .await
        .map_err(api_error)?;

    Ok(Json(GenerateResponse {
        universe_id: request.universe_id,
        template_id: request.template_id,
        candidates_created: created,
    }))
}

/// 후보 라우터 생성.
pub fn candidates_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_candidates).post(create_candidate))
        .route("/{id}/status", patch(update_status))
        .route("/generate", post(generate_candidates))
}
