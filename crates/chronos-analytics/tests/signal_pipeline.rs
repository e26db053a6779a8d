//! 저장소를 거치는 시그널 계산 통합 테스트.

use chrono::NaiveDate;
use chronos_analytics::{compute_and_upsert_signals, SignalProvider, TaSignalProvider};
use chronos_data::{MemoryStore, OhlcvStore, SignalStore, StockStore, StubProvider};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

#[tokio::test]
async fn test_no_bars_writes_nothing() {
    let store = MemoryStore::new();
    let stock = store.get_or_create_stock("AAPL").await.unwrap();

    let written = compute_and_upsert_signals(&store, stock.id, "stub", "1d", &TaSignalProvider::new())
        .await
        .unwrap();

    assert_eq!(written, 0);
    assert!(store.latest_signal(stock.id, "stub", "1d").await.unwrap().is_none());
}

#[tokio::test]
async fn test_insufficient_history_writes_nothing() {
    let store = MemoryStore::new();
    let stock = store.get_or_create_stock("AAPL").await.unwrap();
    store
        .upsert_ohlcv(stock.id, "stub", "1d", &StubProvider::synthetic_rows(start(), 30, 100.0))
        .await
        .unwrap();

    let written = compute_and_upsert_signals(&store, stock.id, "stub", "1d", &TaSignalProvider::new())
        .await
        .unwrap();
    assert_eq!(written, 0);
}

#[tokio::test]
async fn test_recompute_is_idempotent() {
    let store = MemoryStore::new();
    let stock = store.get_or_create_stock("AAPL").await.unwrap();
    let bars = StubProvider::synthetic_rows(start(), 80, 100.0);
    store.upsert_ohlcv(stock.id, "stub", "1d", &bars).await.unwrap();

    let provider = TaSignalProvider::new();
    let first = compute_and_upsert_signals(&store, stock.id, "stub", "1d", &provider)
        .await
        .unwrap();
    let second = compute_and_upsert_signals(&store, stock.id, "stub", "1d", &provider)
        .await
        .unwrap();

    assert_eq!(first, 31);
    assert_eq!(second, 31);
    let stored = store.list_signals(stock.id, "stub", "1d", None).await.unwrap();
    assert_eq!(stored.len(), 31);
    assert_eq!(stored, provider.compute_signals(&bars).unwrap());

    let latest = store.latest_signal(stock.id, "stub", "1d").await.unwrap().unwrap();
    assert_eq!(latest.date, bars.last().unwrap().date);
}
