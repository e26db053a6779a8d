//! # Chronos Core
//!
//! 스크리너 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 종목, 유니버스, 템플릿, 후보 레코드
//! - OHLCV 바와 시그널 행
//! - 캐시 상태 라이프사이클
//! - 시장 운영 시간 정책
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
