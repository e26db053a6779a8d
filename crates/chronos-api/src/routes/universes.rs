//! 유니버스 API 라우트
//!
//! # 엔드포인트
//!
//! - `POST /universes` - 유니버스 생성 (201)
//! - `GET /universes` - 목록
//! - `GET|PATCH|DELETE /universes/{id}` - 조회/수정/삭제
//! - `POST /universes/{id}/stocks` - 종목 추가 (Provider 조회로 티커 검증)
//! - `GET /universes/{id}/stocks` - 소속 티커 목록
//! - `DELETE /universes/{id}/stocks/{ticker}` - 종목 제거
//! - `GET /universes/{id}/candidates` - 후보 목록
//! - `GET /universes/{id}/ohlcv`, `GET /universes/{id}/signals` - 종목별 최근 시계열
//! - `POST /universes/{id}/scan` - 갱신 → 시그널 → 후보 생성

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use chronos_collector::{run_universe_scan, ScanSummary};
use chronos_core::{
    CandidateStatus, NewUniverse, OhlcvRow, SignalRow, Ticker, TradeCandidate, Universe,
    UniverseUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use super::{PageQuery, SeriesQuery};
use crate::error::{api_error, not_found, unprocessable, validate_request, ApiResult};
use crate::state::AppState;

// ================================================================================================
// Request/Response Types
// ================================================================================================

/// 유니버스 생성 요청
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUniverseRequest {
    #[validate(length(min = 1, max = 200, message = "이름은 1-200자여야 합니다"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "설명은 2000자 이하여야 합니다"))]
    pub description: Option<String>,
}

/// 유니버스 수정 요청. 없는 필드는 유지됩니다.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUniverseRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "이름은 1-200자여야 합니다"))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "설명은 2000자 이하여야 합니다"))]
    pub description: Option<String>,
}

/// 종목 추가 요청
#[derive(Debug, Deserialize, Validate)]
pub struct AddTickerRequest {
    #[validate(length(min = 1, max = 20, message = "티커는 1-20자여야 합니다"))]
    pub ticker: String,
    /// 검증에 사용할 Provider (기본값: 설정)
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

/// 종목 추가 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct AddTickerResponse {
    pub universe_id: i64,
    pub stock_id: i64,
    pub ticker: String,
}

/// 후보 목록 쿼리
#[derive(Debug, Deserialize, Validate)]
pub struct UniverseCandidatesQuery {
    #[serde(default)]
    pub status: Option<CandidateStatus>,
    #[serde(default = "default_candidate_limit")]
    #[validate(range(min = 1, max = 500, message = "limit은 1-500 사이여야 합니다"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset은 0 이상이어야 합니다"))]
    pub offset: i64,
}

fn default_candidate_limit() -> i64 {
    100
}

/// 스캔 요청
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub template_id: i64,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub interval: Option<String>,
}

/// 종목 하나의 시계열
#[derive(Debug, Serialize, Deserialize)]
pub struct TickerSeries<T> {
    pub ticker: String,
    pub rows: Vec<T>,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// 유니버스가 없으면 404.
pub(crate) async fn require_universe(state: &AppState, id: i64) -> ApiResult<Universe> {
    state
        .store
        .get_universe(id)
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("universe not found"))
}

/// POST /universes
async fn create_universe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUniverseRequest>,
) -> ApiResult<(StatusCode, Json<Universe>)> {
    validate_request(&request)?;

    let universe = state
        .store
        .create_universe(NewUniverse {
            name: request.name,
            description: request.description,
        })
        .await
        .map_err(api_error)?;

    info!(universe_id = universe.id, name = %universe.name, "유니버스 생성");
    Ok((StatusCode::CREATED, Json(universe)))
}

/// GET /universes
async fn list_universes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<Universe>>> {
    validate_request(&query)?;

    let universes = state
        .store
        .list_universes(query.limit, query.offset)
        .await
        .map_err(api_error)?;
    Ok(Json(universes))
}

/// GET /universes/{id}
async fn get_universe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Universe>> {
    Ok(Json(require_universe(&state, id).await?))
}

/// PATCH /universes/{id}
async fn update_universe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUniverseRequest>,
) -> ApiResult<Json<Universe>> {
    validate_request(&request)?;

    let updated = state
        .store
        .update_universe(
            id,
            UniverseUpdate {
                name: request.name,
                description: request.description,
            },
        )
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("universe not found"))?;
    Ok(Json(updated))
}

/// DELETE /universes/{id}
async fn delete_universe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = state.store.delete_universe(id).await.map_err(api_error)?;
    if !deleted {
        return Err(not_found("universe not found"));
    }

    info!(universe_id = id, "유니버스 삭제");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /universes/{id}/stocks
///
/// 먼저 Provider에서 시세를 조회해 티커를 검증합니다. 결과가 없거나
/// 조회가 실패하면 422.
async fn add_ticker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<AddTickerRequest>,
) -> ApiResult<(StatusCode, Json<AddTickerResponse>)> {
    validate_request(&request)?;
    require_universe(&state, id).await?;

    let ticker = Ticker::parse(&request.ticker)
        .map_err(|_| unprocessable("invalid or unsupported ticker"))?
        .into_inner();

    let provider_name = state.provider_or_default(request.provider);
    let interval = state.interval_or_default(request.interval);
    let provider = state
        .refresh
        .providers()
        .get(&provider_name)
        .map_err(api_error)?;

    match provider.fetch_ohlcv_rows(&ticker, &interval).await {
        Ok(rows) if !rows.is_empty() => {}
        Ok(_) => {
            warn!(ticker = %ticker, provider = %provider_name, "Provider 데이터 없음, 티커 거부");
            return Err(unprocessable("invalid or unsupported ticker"));
        }
        Err(e) => {
            warn!(ticker = %ticker, provider = %provider_name, error = %e, "티커 검증 실패");
            return Err(unprocessable("invalid or unsupported ticker"));
        }
    }

    let stock = state
        .store
        .get_or_create_stock(&ticker)
        .await
        .map_err(api_error)?;
    state
        .store
        .add_member(id, stock.id)
        .await
        .map_err(api_error)?;

    info!(universe_id = id, ticker = %stock.ticker, "유니버스에 종목 추가");
    Ok((
        StatusCode::CREATED,
        Json(AddTickerResponse {
            universe_id: id,
            stock_id: stock.id,
            ticker: stock.ticker,
        }),
    ))
}

/// GET /universes/{id}/stocks
async fn list_tickers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<String>>> {
    require_universe(&state, id).await?;

    let members = state.store.list_members(id).await.map_err(api_error)?;
    Ok(Json(members.into_iter().map(|s| s.ticker).collect()))
}

/// DELETE /universes/{id}/stocks/{ticker}
async fn remove_ticker(
    State(state): State<Arc<AppState>>,
    Path((id, ticker)): Path<(i64, String)>,
) -> ApiResult<StatusCode> {
    require_universe(&state, id).await?;

    let stock = state
        .store
        .get_stock_by_ticker(&ticker)
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("stock not found"))?;

    let removed = state
        .store
        .remove_member(id, stock.id)
        .await
        .map_err(api_error)?;
    if !removed {
        return Err(not_found("membership not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /universes/{id}/candidates
async fn list_universe_candidates(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<UniverseCandidatesQuery>,
) -> ApiResult<Json<Vec<TradeCandidate>>> {
    validate_request(&query)?;
    require_universe(&state, id).await?;

    let candidates = state
        .store
        .list_candidates(id, query.status, query.limit, query.offset)
        .await
        .map_err(api_error)?;
    Ok(Json(candidates))
}

/// GET /universes/{id}/ohlcv?limit=
async fn universe_ohlcv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<Vec<TickerSeries<OhlcvRow>>>> {
    validate_request(&query)?;
    require_universe(&state, id).await?;

    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    let members = state.store.list_members(id).await.map_err(api_error)?;
    let mut series = Vec::with_capacity(members.len());
    for stock in members {
        let rows = state
            .store
            .list_ohlcv(stock.id, &provider, &interval, query.limit)
            .await
            .map_err(api_error)?;
        series.push(TickerSeries {
            ticker: stock.ticker,
            rows,
        });
    }

    Ok(Json(series))
}

/// GET /universes/{id}/signals?limit=
async fn universe_signals(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<Vec<TickerSeries<SignalRow>>>> {
    validate_request(&query)?;
    require_universe(&state, id).await?;

    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    let members = state.store.list_members(id).await.map_err(api_error)?;
    let mut series = Vec::with_capacity(members.len());
    for stock in members {
        let rows = state
            .store
            .list_signals(stock.id, &provider, &interval, query.limit)
            .await
            .map_err(api_error)?;
        series.push(TickerSeries {
            ticker: stock.ticker,
            rows,
        });
    }

    Ok(Json(series))
}

/// POST /universes/{id}/scan
async fn scan_universe(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ScanRequest>,
) -> ApiResult<Json<ScanSummary>> {
    let provider = state.provider_or_default(request.provider);
    let interval = state.interval_or_default(request.interval);

    let summary = run_universe_scan(&state.refresh, id, request.template_id, &provider, &interval)
        .await
        .map_err(api_error)?;
    Ok(Json(summary))
}

// ================================================================================================
// Router
// ================================================================================================

/// 유니버스 라우터 생성.
pub fn universes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_universes).post(create_universe))
        .route(
            "/{id}",
            get(get_universe)
                .patch(update_universe)
                .delete(delete_universe),
        )
        .route("/{id}/stocks", get(list_tickers).post(add_ticker))
        .route("/{id}/stocks/{ticker}", delete(remove_ticker))
        .route("/{id}/candidates", get(list_universe_candidates))
        .route("/{id}/ohlcv", get(universe_ohlcv))
        .route("/{id}/signals", get(universe_signals))
        .route("/{id}/scan", post(scan_universe))
}
