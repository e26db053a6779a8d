//! 유니버스 스캔: 갱신 → 시그널 재계산 → 후보 생성.

use chronos_strategy::{CandidateEngine, CandidateError};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::Result;
use crate::refresh::RefreshService;

/// 스캔 결과 요약.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub universe_id: i64,
    pub template_id: i64,
    pub tickers_processed: usize,
    pub ohlcv_rows_written: usize,
    pub candidates_created: usize,
    pub error_count: usize,
}

/// 유니버스 전체를 갱신하고 템플릿으로 후보를 생성합니다.
///
/// 유니버스와 템플릿은 갱신 전에 확인합니다. 종목별 갱신 실패는
/// `error_count`에만 반영되고 후보 생성은 계속됩니다.
#[instrument(skip(service))]
pub async fn run_universe_scan(
    service: &RefreshService,
    universe_id: i64,
    template_id: i64,
    provider: &str,
    interval: &str,
) -> Result<ScanSummary> {
    let store = service.store();

    if store.get_universe(universe_id).await?.is_none() {
        return Err(CandidateError::UniverseNotFound(universe_id).into());
    }
    if store.get_template(template_id).await?.is_none() {
        return Err(CandidateError::TemplateNotFound(template_id).into());
    }

    let results = service
        .refresh_universe_tickers(universe_id, provider, interval)
        .await?;

    let ohlcv_rows_written = results.iter().map(|r| r.rows_written).sum();
    let error_count = results.iter().filter(|r| r.is_error()).count();

    let candidates_created = CandidateEngine::new(store.clone())
        .generate(universe_id, template_id, provider, interval)
        .await?;

    let summary = ScanSummary {
        universe_id,
        template_id,
        tickers_processed: results.len(),
        ohlcv_rows_written,
        candidates_created,
        error_count,
    };

    info!(
        tickers_processed = summary.tickers_processed,
        ohlcv_rows_written = summary.ohlcv_rows_written,
        candidates_created = summary.candidates_created,
        error_count = summary.error_count,
        "유니버스 스캔 완료"
    );

    Ok(summary)
}
