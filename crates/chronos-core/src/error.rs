//! 스크리너 시스템의 에러 타입.
//!
//! 각 크레이트의 세부 에러는 최종적으로 이 분류로 변환되어
//! API 계층에서 상태 코드로 매핑됩니다.

use thiserror::Error;

/// 핵심 에러 분류.
#[derive(Debug, Error)]
pub enum ChronosError {
    /// 유니버스/템플릿/종목 등 대상이 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 잘못된 템플릿 설정 또는 입력
    #[error("검증 에러: {0}")]
    Validation(String),

    /// 외부 데이터 Provider 에러
    #[error("Provider 에러: {0}")]
    Provider(String),

    /// 고유 키 충돌
    #[error("충돌: {0}")]
    Conflict(String),

    /// 저장소 에러
    #[error("저장소 에러: {0}")]
    Storage(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 스크리너 작업을 위한 Result 타입.
pub type ChronosResult<T> = Result<T, ChronosError>;

impl ChronosError {
    /// 호출자에게 노출해도 되는 클라이언트 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ChronosError::NotFound(_) | ChronosError::Validation(_) | ChronosError::Conflict(_)
        )
    }

    /// 분류 접두어 없이 원래 메시지만 반환합니다.
    pub fn message(&self) -> &str {
        match self {
            ChronosError::NotFound(msg)
            | ChronosError::Validation(msg)
            | ChronosError::Provider(msg)
            | ChronosError::Conflict(msg)
            | ChronosError::Storage(msg)
            | ChronosError::Config(msg)
            | ChronosError::Serialization(msg)
            | ChronosError::Internal(msg) => msg,
        }
    }

    /// 에러 코드 문자열 (API 응답용).
    pub fn code(&self) -> &'static str {
        match self {
            ChronosError::NotFound(_) => "NOT_FOUND",
            ChronosError::Validation(_) => "VALIDATION_ERROR",
            ChronosError::Provider(_) => "PROVIDER_ERROR",
            ChronosError::Conflict(_) => "CONFLICT",
            ChronosError::Storage(_) => "DB_ERROR",
            ChronosError::Config(_) => "CONFIG_ERROR",
            ChronosError::Serialization(_) => "SERIALIZATION_ERROR",
            ChronosError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for ChronosError {
    fn from(err: serde_json::Error) -> Self {
        ChronosError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(ChronosError::NotFound("universe".into()).is_client_error());
        assert!(ChronosError::Conflict("template".into()).is_client_error());
        assert!(!ChronosError::Provider("timeout".into()).is_client_error());
        assert!(!ChronosError::Storage("down".into()).is_client_error());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ChronosError::NotFound("x".into()).code(), "NOT_FOUND");
        assert_eq!(ChronosError::Validation("x".into()).code(), "VALIDATION_ERROR");
        assert_eq!(ChronosError::NotFound("universe not found".into()).message(), "universe not found");
    }
}
