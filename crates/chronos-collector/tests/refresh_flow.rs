//! 가격 갱신 흐름 통합 테스트 (StubProvider + 인메모리 저장소).

use std::sync::Arc;

use chrono::NaiveDate;
use chronos_analytics::SignalProviderRegistry;
use chronos_collector::{run_universe_scan, CollectorError, RefreshService};
use chronos_core::{CacheStatus, NewTemplate, NewUniverse, TemplateKind};
use chronos_data::{
    CacheStatusStore, CandidateStore, DataError, MemoryStore, OhlcvStore, ProviderRegistry,
    SignalStore, StockStore, StubProvider, TemplateStore, UniverseStore,
};
use chronos_strategy::CandidateError;
use serde_json::json;

const PROVIDER: &str = "stub";
const INTERVAL: &str = "1d";

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn service(store: Arc<MemoryStore>, stub: Arc<StubProvider>) -> RefreshService {
    RefreshService::new(
        store,
        ProviderRegistry::new().with(stub),
        SignalProviderRegistry::with_defaults(),
        "ta",
    )
}

#[tokio::test]
async fn test_empty_provider_result_marks_fresh() {
    let store = Arc::new(MemoryStore::new());
    let stub = Arc::new(StubProvider::new(PROVIDER));
    let service = service(store.clone(), stub.clone());

    let result = service
        .refresh_stock_prices("zzzz", PROVIDER, INTERVAL)
        .await
        .unwrap();

    assert_eq!(stub.calls(), 1);
    assert_eq!(result.ticker, "ZZZZ");
    assert_eq!(result.rows_written, 0);
    assert_eq!(result.status, CacheStatus::Fresh);
    assert_eq!(result.detail, None);

    let stock = store.get_stock_by_ticker("ZZZZ").await.unwrap().unwrap();
    assert!(store
        .list_ohlcv(stock.id, PROVIDER, INTERVAL, None)
        .await
        .unwrap()
        .is_empty());

    let cache = store
        .get_cache_status(stock.id, PROVIDER, INTERVAL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cache.status, CacheStatus::Fresh);
}

#[tokio::test]
async fn test_provider_failure_records_error_and_propagates() {
    let store = Arc::new(MemoryStore::new());
    let stub = Arc::new(StubProvider::new(PROVIDER).with_failure("BOOM", "upstream timeout"));
    let service = service(store.clone(), stub);

    let err = service
        .refresh_stock_prices("BOOM", PROVIDER, INTERVAL)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CollectorError::Data(DataError::FetchError(ref msg)) if msg == "upstream timeout"
    ));

    let stock = store.get_stock_by_ticker("BOOM").await.unwrap().unwrap();
    let cache = store
        .get_cache_status(stock.id, PROVIDER, INTERVAL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cache.status, CacheStatus::Error);
    assert!(cache.detail.unwrap().contains("upstream timeout"));
}

#[tokio::test]
async fn test_unknown_provider_records_error() {
    let store = Arc::new(MemoryStore::new());
    let service = service(store.clone(), Arc::new(StubProvider::new(PROVIDER)));

    let err = service
        .refresh_stock_prices("AAPL", "bloomberg", INTERVAL)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CollectorError::Data(DataError::UnknownProvider { .. })
    ));

    let stock = store.get_stock_by_ticker("AAPL").await.unwrap().unwrap();
    let cache = store
        .get_cache_status(stock.id, "bloomberg", INTERVAL)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cache.status, CacheStatus::Error);
    assert!(cache.detail.unwrap().contains("bloomberg"));
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let rows = StubProvider::synthetic_rows(start(), 60, 100.0);
    let stub = Arc::new(StubProvider::new(PROVIDER).with_rows("AAPL", rows));
    let service = service(store.clone(), stub);

    let first = service
        .refresh_stock_prices("AAPL", PROVIDER, INTERVAL)
        .await
        .unwrap();
    let second = service
        .refresh_stock_prices(" aapl ", PROVIDER, INTERVAL)
        .await
        .unwrap();

    assert_eq!(first.rows_written, 60);
    assert_eq!(second.rows_written, 60);
    assert_eq!(second.ticker, "AAPL");

    let stock = store.get_stock_by_ticker("AAPL").await.unwrap().unwrap();
    let bars = store
        .list_ohlcv(stock.id, PROVIDER, INTERVAL, None)
        .await
        .unwrap();
    assert_eq!(bars.len(), 60);
}

#[tokio::test]
async fn test_refresh_and_compute_writes_signals() {
    let store = Arc::new(MemoryStore::new());
    let rows = StubProvider::synthetic_rows(start(), 80, 50.0);
    let stub = Arc::new(StubProvider::new(PROVIDER).with_rows("MSFT", rows));
    let service = service(store.clone(), stub);

    let (result, signals) = service
        .refresh_and_compute("MSFT", PROVIDER, INTERVAL)
        .await
        .unwrap();

    assert_eq!(result.rows_written, 80);
    // 최대 워밍업 50봉 → 80 - 49
    assert_eq!(signals, 31);

    let stock = store.get_stock_by_ticker("MSFT").await.unwrap().unwrap();
    let latest = store
        .latest_signal(stock.id, PROVIDER, INTERVAL)
        .await
        .unwrap()
        .unwrap();
    assert!(latest.is_complete());
}

#[tokio::test]
async fn test_universe_refresh_isolates_failures() {
    let store = Arc::new(MemoryStore::new());
    let stub = Arc::new(
        StubProvider::new(PROVIDER)
            .with_rows("GOOD", StubProvider::synthetic_rows(start(), 10, 20.0))
            .with_failure("BAD", "no such symbol"),
    );
    let service = service(store.clone(), stub);

    let universe = store
        .create_universe(NewUniverse {
            name: "mixed".into(),
            description: None,
        })
        .await
        .unwrap();
    for ticker in ["GOOD", "BAD"] {
        let stock = store.get_or_create_stock(ticker).await.unwrap();
        store.add_member(universe.id, stock.id).await.unwrap();
    }

    let results = service
        .refresh_universe_tickers(universe.id, PROVIDER, INTERVAL)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    let bad = results.iter().find(|r| r.ticker == "BAD").unwrap();
    let good = results.iter().find(|r| r.ticker == "GOOD").unwrap();
    assert!(bad.is_error());
    assert_eq!(bad.rows_written, 0);
    assert!(bad.detail.as_deref().unwrap().contains("no such symbol"));
    assert_eq!(good.status, CacheStatus::Fresh);
    assert_eq!(good.rows_written, 10);
}

#[tokio::test]
async fn test_universe_scan_end_to_end() {
    let store = Arc::new(MemoryStore::new());
    let stub = Arc::new(
        StubProvider::new(PROVIDER)
            .with_rows("AAA", StubProvider::synthetic_rows(start(), 80, 100.0))
            .with_rows("BBB", StubProvider::synthetic_rows(start(), 80, 40.0))
            .with_failure("CCC", "rate limited"),
    );
    let service = service(store.clone(), stub);

    let universe = store
        .create_universe(NewUniverse {
            name: "scan".into(),
            description: None,
        })
        .await
        .unwrap();
    for ticker in ["AAA", "BBB", "CCC"] {
        let stock = store.get_or_create_stock(ticker).await.unwrap();
        store.add_member(universe.id, stock.id).await.unwrap();
    }
    let template = store
        .create_template(NewTemplate {
            kind: TemplateKind::Screen,
            name: "all".into(),
            version: 1,
            description: None,
            config_json: json!({ "entry_rules": [], "score_field": "rsi" }),
        })
        .await
        .unwrap();

    let summary = run_universe_scan(&service, universe.id, template.id, PROVIDER, INTERVAL)
        .await
        .unwrap();

    assert_eq!(summary.tickers_processed, 3);
    assert_eq!(summary.ohlcv_rows_written, 160);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.candidates_created, 2);

    let candidates = store
        .list_candidates(universe.id, None, 100, 0)
        .await
        .unwrap();
    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn test_universe_scan_checks_universe_and_template() {
    let store = Arc::new(MemoryStore::new());
    let stub = Arc::new(StubProvider::new(PROVIDER));
    let service = service(store.clone(), stub.clone());

    let err = run_universe_scan(&service, 999, 1, PROVIDER, INTERVAL)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CollectorError::Candidate(CandidateError::UniverseNotFound(999))
    ));

    let universe = store
        .create_universe(NewUniverse {
            name: "empty".into(),
            description: None,
        })
        .await
        .unwrap();
    let err = run_universe_scan(&service, universe.id, 999, PROVIDER, INTERVAL)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "template not found");
    assert_eq!(stub.calls(), 0);
}
