//! 시그널 Provider와 계산/저장 파이프라인.

mod registry;

pub use registry::SignalProviderRegistry;

use chronos_core::{OhlcvRow, SignalRow};
use chronos_data::Store;
use tracing::{debug, instrument};

use crate::indicators::{compute_signal_rows, IndicatorParams, IndicatorResult};

/// OHLCV 시계열을 시그널 행으로 바꾸는 계산기.
pub trait SignalProvider: Send + Sync {
    /// 레지스트리 등록 이름.
    fn name(&self) -> &str;

    /// 순수 함수: 같은 입력이면 같은 출력.
    fn compute_signals(&self, rows: &[OhlcvRow]) -> IndicatorResult<Vec<SignalRow>>;
}

/// `ta` 크레이트 기반 기본 Provider.
#[derive(Debug, Clone, Default)]
pub struct TaSignalProvider {
    params: IndicatorParams,
}

impl TaSignalProvider {
    pub const NAME: &'static str = "ta";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }
}

impl SignalProvider for TaSignalProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn compute_signals(&self, rows: &[OhlcvRow]) -> IndicatorResult<Vec<SignalRow>> {
        compute_signal_rows(rows, &self.params)
    }
}

/// 저장된 봉을 읽어 시그널을 계산하고 upsert합니다.
///
/// 봉이 없거나 워밍업된 행이 없으면 0을 반환합니다.
#[instrument(skip(store, signal_provider), fields(signal_provider = signal_provider.name()))]
pub async fn compute_and_upsert_signals(
    store: &dyn Store,
    stock_id: i64,
    provider: &str,
    interval: &str,
    signal_provider: &dyn SignalProvider,
) -> IndicatorResult<usize> {
    let bars = store.list_ohlcv(stock_id, provider, interval, None).await?;
    if bars.is_empty() {
        return Ok(0);
    }

    let signals = signal_provider.compute_signals(&bars)?;
    if signals.is_empty() {
        debug!(stock_id, bars = bars.len(), "워밍업 부족, 시그널 없음");
        return Ok(0);
    }

    let written = store
        .upsert_signals(stock_id, provider, interval, &signals)
        .await?;

    debug!(stock_id, written, "시그널 저장 완료");
    Ok(written)
}
