//! 스크리너 데이터 계층.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 저장소 trait과 구현 (PostgreSQL, 인메모리)
//! - 가격 데이터 Provider trait과 이름 기반 레지스트리
//! - Yahoo Finance 어댑터

pub mod error;
pub mod provider;
pub mod store;

pub use error::{DataError, Result};
pub use provider::{PriceProvider, ProviderRegistry, StubProvider, YahooPriceProvider};
pub use store::{
    CacheStatusStore, CandidateStore, MemoryStore, OhlcvStore, PgStore, SignalStore, StockStore,
    Store, StoreHealth, TemplateStore, UniverseStore,
};
