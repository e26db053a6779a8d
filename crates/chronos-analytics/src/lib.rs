//! 기술적 시그널 계산.
//!
//! OHLCV 시계열을 지표 행(RSI, MACD, EMA, 볼린저 밴드)으로 변환합니다.
//! 지표 공식은 `ta` 크레이트를 사용하고, 모든 지표가 워밍업된 날짜만 내보냅니다.

pub mod indicators;
pub mod signals;

pub use indicators::{
    BollingerParams, EmaParams, IndicatorError, IndicatorParams, IndicatorResult, MacdParams,
    RsiParams,
};
pub use signals::{
    compute_and_upsert_signals, SignalProvider, SignalProviderRegistry, TaSignalProvider,
};
