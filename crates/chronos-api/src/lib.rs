//! 스크리너 HTTP API.
//!
//! axum 라우터와 공유 상태, 에러 응답 형식을 제공합니다.
//! 비즈니스 로직은 collector/strategy 크레이트에 있고 이 크레이트는 얇은 계층입니다.

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use routes::{create_api_router, create_router};
pub use state::AppState;
