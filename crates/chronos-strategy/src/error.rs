//! 후보 생성 오류.

use chronos_core::ChronosError;
use chronos_data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CandidateError {
    /// 유니버스 없음
    #[error("universe not found")]
    UniverseNotFound(i64),

    /// 템플릿 없음
    #[error("template not found")]
    TemplateNotFound(i64),

    /// 잘못된 템플릿 설정
    #[error("invalid template config: {0}")]
    InvalidConfig(String),

    /// 저장소 오류
    #[error(transparent)]
    Storage(#[from] DataError),
}

impl From<CandidateError> for ChronosError {
    fn from(err: CandidateError) -> Self {
        match err {
            CandidateError::UniverseNotFound(_) | CandidateError::TemplateNotFound(_) => {
                ChronosError::NotFound(err.to_string())
            }
            CandidateError::InvalidConfig(_) => ChronosError::Validation(err.to_string()),
            CandidateError::Storage(e) => e.into(),
        }
    }
}
