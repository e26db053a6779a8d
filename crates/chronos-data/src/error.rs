//! 데이터 모듈 오류 타입.

use chronos_core::ChronosError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 중복 레코드 (고유 제약 위반)
    #[error("Duplicate record: {0}")]
    DuplicateError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 잘못된 데이터 형식
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 데이터 삽입 오류
    #[error("Insert error: {0}")]
    InsertError(String),

    /// 등록되지 않은 Provider 이름
    #[error("Unknown provider '{name}' (registered: {available})")]
    UnknownProvider { name: String, available: String },

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl DataError {
    /// 외부 Provider에서 발생한 오류인지 확인합니다.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            DataError::UnknownProvider { .. } | DataError::FetchError(_) | DataError::ParseError(_)
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().unwrap_or_default();
                if code == "23505" {
                    // PostgreSQL 고유 제약 조건 위반
                    DataError::DuplicateError(db_err.message().to_string())
                } else {
                    DataError::QueryError(db_err.message().to_string())
                }
            }
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<DataError> for ChronosError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => ChronosError::NotFound(msg),
            DataError::DuplicateError(msg) => ChronosError::Conflict(msg),
            DataError::InvalidData(msg) => ChronosError::Validation(msg),
            DataError::SerializationError(msg) => ChronosError::Serialization(msg),
            e if e.is_provider_error() => ChronosError::Provider(e.to_string()),
            e => ChronosError::Storage(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
