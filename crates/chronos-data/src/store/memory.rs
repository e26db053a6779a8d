//! 인메모리 저장소.
//!
//! 테스트와 `database.use_memory` 실행에서 사용합니다. PostgreSQL 스키마의
//! 고유 제약과 cascade 삭제를 그대로 흉내 냅니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use chronos_core::{
    normalize_ticker, sort_candidates, CacheRecord, CacheStatus, CandidateStatus, NewCandidate,
    NewTemplate, NewUniverse, OhlcvRow, SignalRow, Stock, StrategyTemplate, TemplateKind, Ticker,
    TradeCandidate, Universe, UniverseUpdate,
};
use tokio::sync::RwLock;

use super::{
    dedup_by_date, keep_last, CacheStatusStore, CandidateStore, OhlcvStore, SignalStore,
    StockStore, StoreHealth, TemplateStore, UniverseStore,
};
use crate::error::{DataError, Result};

type SeriesKey = (i64, String, String);

#[derive(Default)]
struct Inner {
    next_id: i64,
    stocks: BTreeMap<i64, Stock>,
    universes: BTreeMap<i64, Universe>,
    /// (universe_id, stock_id)
    members: BTreeSet<(i64, i64)>,
    ohlcv: HashMap<SeriesKey, BTreeMap<NaiveDate, OhlcvRow>>,
    cache: HashMap<SeriesKey, CacheRecord>,
    signals: HashMap<SeriesKey, BTreeMap<NaiveDate, SignalRow>>,
    templates: BTreeMap<i64, StrategyTemplate>,
    candidates: BTreeMap<i64, TradeCandidate>,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn stock_by_ticker(&self, ticker: &str) -> Option<&Stock> {
        self.stocks.values().find(|s| s.ticker == ticker)
    }

    fn sorted_stocks(&self, ids: impl Iterator<Item = i64>) -> Vec<Stock> {
        let mut stocks: Vec<Stock> = ids.filter_map(|id| self.stocks.get(&id).cloned()).collect();
        stocks.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        stocks.dedup_by_key(|s| s.id);
        stocks
    }
}

fn series_key(stock_id: i64, provider: &str, interval: &str) -> SeriesKey {
    (stock_id, provider.to_string(), interval.to_string())
}

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

/// `tokio::sync::RwLock` 기반 저장소.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StockStore for MemoryStore {
    async fn get_or_create_stock(&self, ticker: &str) -> Result<Stock> {
        let ticker = Ticker::parse(ticker)
            .map_err(|e| DataError::InvalidData(e.message().to_string()))?
            .into_inner();

        let mut inner = self.inner.write().await;
        if let Some(stock) = inner.stock_by_ticker(&ticker) {
            return Ok(stock.clone());
        }

        let id = inner.next_id();
        let stock = Stock {
            id,
            ticker,
            name: None,
        };
        inner.stocks.insert(id, stock.clone());
        Ok(stock)
    }

    async fn get_stock_by_ticker(&self, ticker: &str) -> Result<Option<Stock>> {
        let ticker = normalize_ticker(ticker);
        Ok(self.inner.read().await.stock_by_ticker(&ticker).cloned())
    }

    async fn list_tracked_stocks(&self) -> Result<Vec<Stock>> {
        let inner = self.inner.read().await;
        let ids: BTreeSet<i64> = inner.members.iter().map(|(_, stock_id)| *stock_id).collect();
        Ok(inner.sorted_stocks(ids.into_iter()))
    }
}

#[async_trait]
impl UniverseStore for MemoryStore {
    async fn create_universe(&self, new: NewUniverse) -> Result<Universe> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let universe = Universe {
            id,
            name: new.name,
            description: new.description,
            created_at: Utc::now(),
        };
        inner.universes.insert(id, universe.clone());
        Ok(universe)
    }

    async fn get_universe(&self, id: i64) -> Result<Option<Universe>> {
        Ok(self.inner.read().await.universes.get(&id).cloned())
    }

    async fn list_universes(&self, limit: i64, offset: i64) -> Result<Vec<Universe>> {
        let inner = self.inner.read().await;
        Ok(page(inner.universes.values().cloned().collect(), limit, offset))
    }

    async fn update_universe(&self, id: i64, update: UniverseUpdate) -> Result<Option<Universe>> {
        let mut inner = self.inner.write().await;
        Ok(inner.universes.get_mut(&id).map(|universe| {
            update.apply(universe);
            universe.clone()
        }))
    }

    async fn delete_universe(&self, id: i64) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.universes.remove(&id).is_none() {
            return Ok(false);
        }
        inner.members.retain(|(universe_id, _)| *universe_id != id);
        inner.candidates.retain(|_, c| c.universe_id != id);
        Ok(true)
    }

    async fn add_member(&self, universe_id: i64, stock_id: i64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.universes.contains_key(&universe_id) {
            return Err(DataError::NotFound(format!("universe {universe_id}")));
        }
        if !inner.stocks.contains_key(&stock_id) {
            return Err(DataError::NotFound(format!("stock {stock_id}")));
        }
        inner.members.insert((universe_id, stock_id));
        Ok(())
    }

    async fn remove_member(&self, universe_id: i64, stock_id: i64) -> Result<bool> {
        Ok(self
            .inner
            .write()
            .await
            .members
            .remove(&(universe_id, stock_id)))
    }

    async fn list_members(&self, universe_id: i64) -> Result<Vec<Stock>> {
        let inner = self.inner.read().await;
        let ids = inner
            .members
            .range((universe_id, i64::MIN)..=(universe_id, i64::MAX))
            .map(|(_, stock_id)| *stock_id);
        Ok(inner.sorted_stocks(ids))
    }
}

#[async_trait]
impl OhlcvStore for MemoryStore {
    async fn upsert_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[OhlcvRow],
    ) -> Result<usize> {
        let rows = dedup_by_date(rows, |r| r.date);
        let mut inner = self.inner.write().await;
        let series = inner
            .ohlcv
            .entry(series_key(stock_id, provider, interval))
            .or_default();
        for row in &rows {
            series.insert(row.date, row.clone());
        }
        Ok(rows.len())
    }

    async fn list_ohlcv(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<OhlcvRow>> {
        let inner = self.inner.read().await;
        let rows = inner
            .ohlcv
            .get(&series_key(stock_id, provider, interval))
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default();
        Ok(keep_last(rows, limit))
    }
}

#[async_trait]
impl CacheStatusStore for MemoryStore {
    async fn get_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<CacheRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .cache
            .get(&series_key(stock_id, provider, interval))
            .cloned())
    }

    async fn upsert_cache_status(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        status: CacheStatus,
        detail: Option<String>,
    ) -> Result<CacheRecord> {
        let record = CacheRecord {
            stock_id,
            provider: provider.to_string(),
            interval: interval.to_string(),
            status,
            last_fetched_at: Utc::now(),
            detail,
        };
        self.inner
            .write()
            .await
            .cache
            .insert(series_key(stock_id, provider, interval), record.clone());
        Ok(record)
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn upsert_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        rows: &[SignalRow],
    ) -> Result<usize> {
        let rows = dedup_by_date(rows, |r| r.date);
        let mut inner = self.inner.write().await;
        let series = inner
            .signals
            .entry(series_key(stock_id, provider, interval))
            .or_default();
        for row in &rows {
            series.insert(row.date, row.clone());
        }
        Ok(rows.len())
    }

    async fn list_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
        limit: Option<i64>,
    ) -> Result<Vec<SignalRow>> {
        let inner = self.inner.read().await;
        let rows = inner
            .signals
            .get(&series_key(stock_id, provider, interval))
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default();
        Ok(keep_last(rows, limit))
    }

    async fn latest_signal(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Option<SignalRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .signals
            .get(&series_key(stock_id, provider, interval))
            .and_then(|series| series.values().next_back().cloned()))
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn create_template(&self, new: NewTemplate) -> Result<StrategyTemplate> {
        let mut inner = self.inner.write().await;
        let exists = inner
            .templates
            .values()
            .any(|t| t.kind == new.kind && t.name == new.name && t.version == new.version);
        if exists {
            return Err(DataError::DuplicateError(format!(
                "template {}/{}/{}",
                new.kind, new.name, new.version
            )));
        }

        let id = inner.next_id();
        let template = StrategyTemplate {
            id,
            kind: new.kind,
            name: new.name,
            version: new.version,
            description: new.description,
            config_json: new.config_json,
            created_at: Utc::now(),
        };
        inner.templates.insert(id, template.clone());
        Ok(template)
    }

    async fn get_template(&self, id: i64) -> Result<Option<StrategyTemplate>> {
        Ok(self.inner.read().await.templates.get(&id).cloned())
    }

    async fn list_templates(
        &self,
        kind: Option<TemplateKind>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<StrategyTemplate>> {
        let inner = self.inner.read().await;
        let templates = inner
            .templates
            .values()
            .filter(|t| kind.map_or(true, |k| t.kind == k))
            .cloned()
            .collect();
        Ok(page(templates, limit, offset))
    }
}

#[async_trait]
impl CandidateStore for MemoryStore {
    async fn insert_candidates(&self, items: &[NewCandidate]) -> Result<Vec<TradeCandidate>> {
        let mut inner = self.inner.write().await;
        for item in items {
            if !inner.universes.contains_key(&item.universe_id) {
                return Err(DataError::NotFound(format!("universe {}", item.universe_id)));
            }
            if !inner.templates.contains_key(&item.template_id) {
                return Err(DataError::NotFound(format!("template {}", item.template_id)));
            }
        }

        let as_of = Utc::now();
        let mut created = Vec::with_capacity(items.len());
        for item in items {
            let id = inner.next_id();
            let candidate = TradeCandidate {
                id,
                universe_id: item.universe_id,
                template_id: item.template_id,
                ticker: normalize_ticker(&item.ticker),
                as_of,
                score: item.score,
                status: item.status,
                reason_code: item.reason_code.clone(),
                payload_json: item.payload_json.clone(),
            };
            inner.candidates.insert(id, candidate.clone());
            created.push(candidate);
        }
        Ok(created)
    }

    async fn list_candidates(
        &self,
        universe_id: i64,
        status: Option<CandidateStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<TradeCandidate>> {
        let inner = self.inner.read().await;
        let mut candidates: Vec<TradeCandidate> = inner
            .candidates
            .values()
            .filter(|c| c.universe_id == universe_id)
            .filter(|c| status.map_or(true, |s| c.status == s))
            .cloned()
            .collect();
        sort_candidates(&mut candidates);
        Ok(page(candidates, limit, offset))
    }

    async fn update_candidate_status(
        &self,
        id: i64,
        status: CandidateStatus,
        reason_code: Option<String>,
    ) -> Result<Option<TradeCandidate>> {
        let mut inner = self.inner.write().await;
        Ok(inner.candidates.get_mut(&id).map(|candidate| {
            candidate.status = status;
            candidate.reason_code = reason_code;
            candidate.clone()
        }))
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(day: u32, close: f64) -> OhlcvRow {
        OhlcvRow::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), close, close, close, close)
    }

    #[tokio::test]
    async fn test_get_or_create_stock_is_idempotent() {
        let store = MemoryStore::new();
        let a = store.get_or_create_stock(" aapl ").await.unwrap();
        let b = store.get_or_create_stock("AAPL").await.unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.ticker, "AAPL");
        assert!(store.get_or_create_stock("  ").await.is_err());
        assert!(matches!(
            store.get_or_create_stock(" aa pl ").await,
            Err(DataError::InvalidData(_))
        ));
        assert!(store.get_stock_by_ticker("AA PL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ohlcv_upsert_overwrites_and_limit_keeps_latest() {
        let store = MemoryStore::new();
        let stock = store.get_or_create_stock("MSFT").await.unwrap();

        store
            .upsert_ohlcv(stock.id, "stub", "1d", &[row(1, 1.0), row(2, 2.0), row(3, 3.0)])
            .await
            .unwrap();
        store
            .upsert_ohlcv(stock.id, "stub", "1d", &[row(3, 30.0)])
            .await
            .unwrap();

        let all = store.list_ohlcv(stock.id, "stub", "1d", None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].close, 30.0);

        let last_two = store.list_ohlcv(stock.id, "stub", "1d", Some(2)).await.unwrap();
        assert_eq!(last_two.iter().map(|r| r.close).collect::<Vec<_>>(), vec![2.0, 30.0]);
    }

    #[tokio::test]
    async fn test_tracked_stocks_dedup_and_sorted() {
        let store = MemoryStore::new();
        let u1 = store
            .create_universe(NewUniverse { name: "a".into(), description: None })
            .await
            .unwrap();
        let u2 = store
            .create_universe(NewUniverse { name: "b".into(), description: None })
            .await
            .unwrap();
        let zz = store.get_or_create_stock("ZZ").await.unwrap();
        let aa = store.get_or_create_stock("AA").await.unwrap();
        store.get_or_create_stock("UNTRACKED").await.unwrap();

        store.add_member(u1.id, zz.id).await.unwrap();
        store.add_member(u1.id, aa.id).await.unwrap();
        store.add_member(u2.id, zz.id).await.unwrap();
        store.add_member(u2.id, zz.id).await.unwrap();

        let tracked: Vec<String> = store
            .list_tracked_stocks()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.ticker)
            .collect();
        assert_eq!(tracked, vec!["AA", "ZZ"]);
    }

    #[tokio::test]
    async fn test_delete_universe_cascades() {
        let store = MemoryStore::new();
        let universe = store
            .create_universe(NewUniverse { name: "u".into(), description: None })
            .await
            .unwrap();
        let stock = store.get_or_create_stock("AAPL").await.unwrap();
        store.add_member(universe.id, stock.id).await.unwrap();
        let template = store
            .create_template(NewTemplate {
                kind: TemplateKind::Screen,
                name: "t".into(),
                version: 1,
                description: None,
                config_json: json!({"entry_rules": []}),
            })
            .await
            .unwrap();
        store
            .insert_candidates(&[NewCandidate {
                universe_id: universe.id,
                template_id: template.id,
                ticker: "AAPL".into(),
                score: 1.0,
                status: CandidateStatus::Proposed,
                reason_code: None,
                payload_json: json!({}),
            }])
            .await
            .unwrap();

        assert!(store.delete_universe(universe.id).await.unwrap());
        assert!(store.list_members(universe.id).await.unwrap().is_empty());
        assert!(store
            .list_candidates(universe.id, None, 100, 0)
            .await
            .unwrap()
            .is_empty());
        assert!(!store.delete_universe(universe.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_template_rejected() {
        let store = MemoryStore::new();
        let new = NewTemplate {
            kind: TemplateKind::Strategy,
            name: "oversold".into(),
            version: 1,
            description: None,
            config_json: json!({"entry_rules": []}),
        };
        store.create_template(new.clone()).await.unwrap();
        let err = store.create_template(new).await.unwrap_err();
        assert!(matches!(err, DataError::DuplicateError(_)));
    }
}
