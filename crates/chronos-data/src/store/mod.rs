//! 저장소 trait.
//!
//! 서비스는 `Arc<dyn Store>`만 알고, PostgreSQL([`PgStore`])과
//! 인메모리([`MemoryStore`]) 구현이 같은 의미를 제공합니다.
//!
//! 공통 규칙:
//! - 티커는 저장 전에 정규화됩니다 (trim + uppercase)
//! - OHLCV/시그널은 (종목, provider, interval, date) 키로 upsert하며, 한 배치에
//!   같은 날짜가 여러 번 있으면 마지막 행만 기록
//! - 시계열 조회는 항상 날짜 오름차순이며 `limit`은 최근 N개를 뜻함
//! - 종목/멤버십 생성의 고유 키 경합은 재조회로 해소

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use chronos_core::{
    CacheRecord, CacheStatus, CandidateStatus, NewCandidate, NewTemplate, NewUniverse, OhlcvRow,
    SignalRow, Stock, StrategyTemplate, TemplateKind, TradeCandidate, Universe, UniverseUpdate,
};

use crate::error::Result;

/// 종목 저장소.
#[async_trait]
pub trait StockStore: Send + Sync {
    /// 티커로 종목을 조회하거나 없으면 생성합니다 (멱등).
    async fn get_or_create_stock(&self, ticker: &str) -> Result<Stock>;

    async fn get_stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>>;

    /// 하나 이상의 유니버스에 속한 종목 (중복 제거, 티커순).
    async fn list_tracked_stocks(&self) -> Result<Vec<Stock>>;
}

/// 유니버스와 멤버십 저장소.
#[async_trait]
pub trait UniverseStore: Send + Sync {
    async fn create_universe(&self, new: NewUniverse) -> Result<Universe>;

    async fn get_universe(&self, id: i64) -> Result<Option<Universe>>;

    async fn list_universes(&self, limit: i64, offset: i64) -> Result<Vec<Universe>>;

    async fn update_universe(&self, id: i64, update: UniverseUpdate) -> Result<Option<Universe>>;

    /// 유니버스를 삭제합니다. 멤버십과 후보도 함께 삭제됩니다.
    async fn delete_universe(&self, id: i64) -> Result<bool>;

    /// 멤버십을 추가합니다. 이미 있으면 아무것도 하지 않습니다.
    async fn add_member(&self, universe_id: i64, stock_id: i64) -> Result<()>;

    async fn remove_member(&self, universe_id: i64, stock_id: i64) -> Result<bool>;

    /// 유니버스 소속 종목 (티커순).
    async fn list_members(&self, universe_id: i64) -> Result<Vec<Stock>>;
}

/// OHLCV 봉 저장소.
#[async_trait]
pub trait OhlcvStore: Send + Sync {
    /// 행을 upsert하고 기록한 행 수를 반환합니다.
    async fn upsert_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[OhlcvRow],
    ) -> Result<usize>;

    async fn list_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<OhlcvRow>>;
}

/// 캐시 상태 저장소.
#[async_trait]
pub trait CacheStatusStore: Send + Sync {
    async fn get_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<CacheRecord>>;

    /// 상태를 생성하거나 덮어씁니다. `last_fetched_at`은 항상 현재 시각.
    async fn upsert_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        status: CacheStatus,
        detail: Option<String>,
    ) -> Result<CacheRecord>;
}

/// 시그널 저장소.
#[async_trait]
pub trait SignalStore: Send + Sync {
    async fn upsert_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[SignalRow],
    ) -> Result<usize>;

    async fn list_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SignalRow>>;

    /// 가장 최근 날짜의 시그널 행 하나만 조회합니다.
    async fn latest_signal(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<SignalRow>>;
}

/// 템플릿 저장소.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// (kind, name, version)이 이미 있으면 `DuplicateError`.
    async fn create_template(&self, new: NewTemplate) -> Result<StrategyTemplate>;

    async fn get_template(&self, id: i64) -> Result<Option<StrategyTemplate>>;

    async fn list_templates(
        &self,
        kind: Option<TemplateKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StrategyTemplate>>;
}

/// 후보 저장소. 후보는 추가만 되며 상태만 변경됩니다.
#[async_trait]
pub trait CandidateStore: Send + Sync {
    /// 한 번의 쓰기로 일괄 삽입합니다.
    async fn insert_candidates(&self, items: &[NewCandidate]) -> Result<Vec<TradeCandidate>>;

    /// `as_of` 내림차순, `score` 내림차순.
    async fn list_candidates(
        &self,
        universe_id: i64,
        status: Option<CandidateStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TradeCandidate>>;

    async fn update_candidate_status(
        &self,
        id: i64,
        status: CandidateStatus,
        reason_code: Option<String>,
    ) -> Result<Option<TradeCandidate>>;
}

/// 저장소 상태 확인.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    /// 백엔드 이름 ("postgres", "memory").
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<()>;
}

/// 모든 저장소 trait의 묶음.
pub trait Store:
    StockStore
    + UniverseStore
    + OhlcvStore
    + CacheStatusStore
    + SignalStore
    + TemplateStore
    + CandidateStore
    + StoreHealth
{
}

impl<T> Store for T where
    T: StockStore
        + UniverseStore
        + OhlcvStore
        + CacheStatusStore
        + SignalStore
        + TemplateStore
        + CandidateStore
        + StoreHealth
{
}

/// 오름차순 시계열에서 최근 `limit`개만 남깁니다.
pub(crate) fn keep_last<T>(mut rows: Vec<T>, limit: Option<i64>) -> Vec<T> {
    if let Some(limit) = limit {
        let limit = limit.max(0) as usize;
        if rows.len() > limit {
            rows.drain(..rows.len() - limit);
        }
    }
    rows
}

/// 날짜 오름차순으로 정렬하고 같은 날짜는 마지막 행만 남깁니다.
///
/// 한 번의 `ON CONFLICT DO UPDATE`가 같은 키를 두 번 건드리면 PostgreSQL이
/// 거부하므로 배치 쓰기 전에 항상 거칩니다.
pub(crate) fn dedup_by_date<T: Clone>(rows: &[T], date: impl Fn(&T) -> NaiveDate) -> Vec<T> {
    let mut indexed: Vec<(usize, &T)> = rows.iter().enumerate().collect();
    indexed.sort_by_key(|(i, row)| (date(row), *i));

    let mut out: Vec<T> = Vec::with_capacity(rows.len());
    for (_, row) in indexed {
        match out.last_mut() {
            Some(last) if date(last) == date(row) => *last = row.clone(),
            _ => out.push(row.clone()),
        }
    }
    out
}
