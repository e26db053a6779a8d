//! 종목 API 라우트
//!
//! - `POST /stocks/{ticker}/refresh` - 백그라운드 갱신 시작 (202)
//! - `GET /stocks/{ticker}/status` - 캐시 상태
//! - `GET /stocks/{ticker}/ohlcv`, `GET /stocks/{ticker}/signals` - 시계열

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use chronos_core::{CacheStatus, OhlcvRow, SignalRow, Stock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::{ProviderQuery, SeriesQuery};
use crate::error::{api_error, not_found, validate_request, ApiResult};
use crate::state::AppState;

/// 캐시 상태 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct StockStatusResponse {
    pub ticker: String,
    pub provider: String,
    pub interval: String,
    pub status: CacheStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fetched_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// `fetching`이 설정된 시간보다 오래 유지된 경우
    pub stale: bool,
}

async fn status_for_stock(
    state: &AppState,
    stock: &Stock,
    provider: String,
    interval: String,
) -> ApiResult<StockStatusResponse> {
    let record = state
        .store
        .get_cache_status(stock.id, &provider, &interval)
        .await
        .map_err(api_error)?;

    Ok(match record {
        Some(record) => StockStatusResponse {
            ticker: stock.ticker.clone(),
            stale: record.is_stale_fetching(Utc::now(), state.config.scheduler.stale_fetching),
            provider: record.provider,
            interval: record.interval,
            status: record.status,
            last_fetched_at: Some(record.last_fetched_at),
            detail: record.detail,
        },
        None => StockStatusResponse {
            ticker: stock.ticker.clone(),
            provider,
            interval,
            status: CacheStatus::Unknown,
            last_fetched_at: None,
            detail: None,
            stale: false,
        },
    })
}

async fn require_stock(state: &AppState, ticker: &str) -> ApiResult<Stock> {
    state
        .store
        .get_stock_by_ticker(ticker)
        .await
        .map_err(api_error)?
        .ok_or_else(|| not_found("stock not found"))
}

/// POST /stocks/{ticker}/refresh
///
/// 갱신을 별도 태스크로 시작하고 시작 시점의 캐시 상태를 반환합니다.
/// 스케줄러와 동시에 실행될 수 있으며 마지막 쓰기가 남습니다.
async fn refresh_stock(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<ProviderQuery>,
) -> ApiResult<(StatusCode, Json<StockStatusResponse>)> {
    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    let stock = state
        .store
        .get_or_create_stock(&ticker)
        .await
        .map_err(api_error)?;
    let current = status_for_stock(&state, &stock, provider.clone(), interval.clone()).await?;

    let refresh = state.refresh.clone();
    let symbol = stock.ticker.clone();
    tokio::spawn(async move {
        if let Err(e) = refresh.refresh_and_compute(&symbol, &provider, &interval).await {
            error!(ticker = %symbol, error = %e, "백그라운드 갱신 실패");
        }
    });

    info!(ticker = %stock.ticker, "백그라운드 갱신 시작");
    Ok((StatusCode::ACCEPTED, Json(current)))
}

/// GET /stocks/{ticker}/status
async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<ProviderQuery>,
) -> ApiResult<Json<StockStatusResponse>> {
    let stock = require_stock(&state, &ticker).await?;
    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    Ok(Json(
        status_for_stock(&state, &stock, provider, interval).await?,
    ))
}

/// GET /stocks/{ticker}/ohlcv?limit=
async fn get_ohlcv(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<Vec<OhlcvRow>>> {
    validate_request(&query)?;
    let stock = require_stock(&state, &ticker).await?;
    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    let rows = state
        .store
        .list_ohlcv(stock.id, &provider, &interval, query.limit)
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// GET /stocks/{ticker}/signals?limit=
async fn get_signals(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<Vec<SignalRow>>> {
    validate_request(&query)?;
    let stock = require_stock(&state, &ticker).await?;
    let provider = state.provider_or_default(query.provider);
    let interval = state.interval_or_default(query.interval);

    let rows = state
        .store
        .list_signals(stock.id, &provider, &interval, query.limit)
        .await
        .map_err(api_error)?;
    Ok(Json(rows))
}

/// 종목 라우터 생성.
pub fn stocks_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{ticker}/refresh", post(refresh_stock))
        .route("/{ticker}/status", get(get_status))
        .route("/{ticker}/ohlcv", get(get_ohlcv))
        .route("/{ticker}/signals", get(get_signals))
}
