//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트는 `ApiResult<T>`를 반환하고, 도메인 에러는
//! `ChronosError` 분류를 거쳐 상태 코드로 매핑됩니다.

use axum::{http::StatusCode, Json};
use chronos_core::ChronosError;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use validator::{Validate, ValidationErrors};

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "universe not found",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "DB_ERROR", "VALIDATION_ERROR", "NOT_FOUND")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 타임스탬프를 포함한 에러를 생성합니다.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

pub type ApiResult<T> = Result<T, ApiError>;

/// 에러 분류별 HTTP 상태 코드.
pub fn status_for(err: &ChronosError) -> StatusCode {
    match err {
        ChronosError::NotFound(_) => StatusCode::NOT_FOUND,
        ChronosError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ChronosError::Conflict(_) => StatusCode::CONFLICT,
        ChronosError::Provider(_) => StatusCode::BAD_GATEWAY,
        ChronosError::Storage(_)
        | ChronosError::Config(_)
        | ChronosError::Serialization(_)
        | ChronosError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// 도메인 에러를 API 에러로 변환합니다. `map_err(api_error)`로 사용합니다.
pub fn api_error<E: Into<ChronosError>>(err: E) -> ApiError {
    let err: ChronosError = err.into();
    let status = status_for(&err);

    if status.is_server_error() {
        error!(code = err.code(), error = %err, "요청 처리 실패");
    } else {
        debug!(code = err.code(), error = %err, "클라이언트 에러");
    }

    (status, Json(ApiErrorResponse::new(err.code(), err.message())))
}

/// 404 응답.
pub fn not_found(message: impl Into<String>) -> ApiError {
    api_error(ChronosError::NotFound(message.into()))
}

/// 422 응답.
pub fn unprocessable(message: impl Into<String>) -> ApiError {
    api_error(ChronosError::Validation(message.into()))
}

/// `validator` 검사를 실행하고 실패 메시지를 하나로 합칩니다.
pub fn validate_request<T: Validate>(request: &T) -> ApiResult<()> {
    request.validate().map_err(|errors| unprocessable(join_errors(&errors)))
}

fn join_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ChronosError::NotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ChronosError::Validation("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&ChronosError::Conflict("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ChronosError::Storage("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_error_uses_raw_message() {
        let (status, Json(body)) = not_found("universe not found");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.message, "universe not found");
        assert!(body.timestamp.is_some());
    }

    #[test]
    fn test_validation_messages_joined() {
        #[derive(Validate)]
        struct Request {
            #[validate(length(min = 1, message = "name은 비어 있을 수 없습니다"))]
            name: String,
        }

        let (status, Json(body)) = validate_request(&Request { name: String::new() }).unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.message, "name은 비어 있을 수 없습니다");
    }
}
