//! 에러 타입 정의.

use chronos_analytics::IndicatorError;
use chronos_core::ChronosError;
use chronos_data::DataError;
use chronos_strategy::CandidateError;
use thiserror::Error;

/// Collector 에러 타입
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 저장소 또는 가격 Provider 에러
    #[error(transparent)]
    Data(#[from] DataError),

    /// 시그널 계산 에러
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    /// 후보 생성 에러
    #[error(transparent)]
    Candidate(#[from] CandidateError),

    /// 설정 에러
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<CollectorError> for ChronosError {
    fn from(err: CollectorError) -> Self {
        match err {
            CollectorError::Data(e) => e.into(),
            CollectorError::Indicator(e) => e.into(),
            CollectorError::Candidate(e) => e.into(),
            CollectorError::Config(msg) => ChronosError::Config(msg),
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
