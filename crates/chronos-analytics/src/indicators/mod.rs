//! 기술적 지표 모듈.
//!
//! # 지원 지표
//!
//! - **RSI**: 상대강도지수 (기본 14)
//! - **MACD**: 이동평균 수렴/확산과 시그널선 (기본 12/26/9)
//! - **EMA**: 지수 이동평균 (기본 20, 50)
//! - **Bollinger Bands**: 볼린저 밴드 상단/하단 (기본 20, 2.0σ)
//!
//! 계산은 [`compute_signal_rows`] 한 곳에서 이루어지며, 모든 지표의
//! 워밍업이 끝난 날짜부터 행을 내보냅니다.

mod compute;
mod params;

pub use compute::compute_signal_rows;
pub use params::{BollingerParams, EmaParams, IndicatorParams, MacdParams, RsiParams};

use chronos_core::ChronosError;
use chronos_data::DataError;
use thiserror::Error;

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 등록되지 않은 시그널 Provider
    #[error("Unknown signal provider '{name}' (registered: {available})")]
    UnknownProvider { name: String, available: String },

    /// 저장소 오류
    #[error(transparent)]
    Storage(#[from] DataError),
}

impl From<ta::errors::TaError> for IndicatorError {
    fn from(err: ta::errors::TaError) -> Self {
        IndicatorError::InvalidParameter(format!("{err:?}"))
    }
}

impl From<IndicatorError> for ChronosError {
    fn from(err: IndicatorError) -> Self {
        match err {
            IndicatorError::Storage(e) => e.into(),
            IndicatorError::UnknownProvider { .. } => ChronosError::Provider(err.to_string()),
            IndicatorError::InvalidParameter(msg) => ChronosError::Config(msg),
        }
    }
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;
