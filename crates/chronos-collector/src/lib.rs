//! 가격 캐시 갱신과 장중 스케줄러.
//!
//! 이 crate는 API 서버와 CLI가 공유하는 갱신 계층을 제공합니다:
//! - 종목 단위 가격 갱신 (캐시 상태 전이 포함)
//! - 유니버스 스캔 (갱신 → 시그널 재계산 → 후보 생성)
//! - 장중에만 동작하는 취소 가능한 갱신 스케줄러

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod refresh;
pub mod scan;
pub mod scheduler;
pub mod stats;

pub use bootstrap::{build_refresh_service, default_price_providers, open_store};
pub use config::{CollectorConfig, SchedulerSettings};
pub use error::{CollectorError, Result};
pub use refresh::{RefreshResult, RefreshService};
pub use scan::{run_universe_scan, ScanSummary};
pub use scheduler::{Clock, MarketRefreshScheduler};
pub use stats::RefreshStats;
