//! API 라우트.
//!
//! # 엔드포인트
//!
//! - `/health` - 헬스 체크
//! - `/universes` - 유니버스, 멤버십, 유니버스 단위 조회와 스캔
//! - `/stocks` - 종목별 갱신, 캐시 상태, 시계열 조회
//! - `/templates` - 전략/스크린 템플릿
//! - `/candidates` - 매매 후보

pub mod candidates;
pub mod health;
pub mod stocks;
pub mod templates;
pub mod universes;

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use serde::Deserialize;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use validator::Validate;

pub use candidates::candidates_router;
pub use health::health_router;
pub use stocks::stocks_router;
pub use templates::templates_router;
pub use universes::universes_router;

use crate::state::AppState;

/// 상태가 주입되지 않은 API 라우터.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health_router())
        .nest("/universes", universes_router())
        .nest("/stocks", stocks_router())
        .nest("/templates", templates_router())
        .nest("/candidates", candidates_router())
}

/// 상태와 공통 미들웨어가 적용된 전체 라우터.
pub fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
}

/// 목록 조회 쿼리.
#[derive(Debug, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default = "default_page_limit")]
    #[validate(range(min = 1, max = 500, message = "limit은 1-500 사이여야 합니다"))]
    pub limit: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "offset은 0 이상이어야 합니다"))]
    pub offset: i64,
}

fn default_page_limit() -> i64 {
    50
}

/// 시계열 조회 쿼리. Provider/간격이 없으면 설정 기본값을 씁니다.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SeriesQuery {
    pub provider: Option<String>,
    pub interval: Option<String>,
    /// 최근 N개 (오름차순으로 반환)
    #[validate(range(min = 1, max = 5000, message = "limit은 1-5000 사이여야 합니다"))]
    pub limit: Option<i64>,
}

/// Provider/간격 지정 쿼리.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderQuery {
    pub provider: Option<String>,
    pub interval: Option<String>,
}
