//! 장중 갱신 스케줄러 테스트 (멈춘 tokio 시간).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::America::New_York;
use chronos_analytics::SignalProviderRegistry;
use chronos_collector::{Clock, CollectorConfig, MarketRefreshScheduler, RefreshService};
use chronos_core::NewUniverse;
use chronos_data::{MemoryStore, ProviderRegistry, StockStore, StubProvider, UniverseStore};
use tokio_util::sync::CancellationToken;

const PROVIDER: &str = "stub";

/// 멈춘 tokio 시간에 맞춰 흐르는 시계.
fn clock_from(start: DateTime<Utc>) -> Clock {
    let origin = tokio::time::Instant::now();
    Arc::new(move || {
        let elapsed = tokio::time::Instant::now().duration_since(origin);
        start + chrono::Duration::from_std(elapsed).unwrap()
    })
}

fn new_york(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    New_York
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

async fn setup(tickers: &[&str]) -> (RefreshService, Arc<StubProvider>, CollectorConfig) {
    let store = Arc::new(MemoryStore::new());
    let mut stub = StubProvider::new(PROVIDER);
    for ticker in tickers {
        stub = stub.with_rows(
            ticker,
            StubProvider::synthetic_rows(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 5, 10.0),
        );
    }
    let stub = Arc::new(stub);

    let universe = store
        .create_universe(NewUniverse {
            name: "tracked".into(),
            description: None,
        })
        .await
        .unwrap();
    for ticker in tickers {
        let stock = store.get_or_create_stock(ticker).await.unwrap();
        store.add_member(universe.id, stock.id).await.unwrap();
    }

    let service = RefreshService::new(
        store,
        ProviderRegistry::new().with(stub.clone()),
        SignalProviderRegistry::with_defaults(),
        "ta",
    );
    let config = CollectorConfig {
        default_provider: PROVIDER.to_string(),
        ..CollectorConfig::default()
    };

    (service, stub, config)
}

#[tokio::test(start_paused = true)]
async fn test_open_market_refreshes_every_interval() {
    let (service, stub, config) = setup(&["AAA", "BBB"]).await;
    // 2024-06-03 (월) 10:00 뉴욕
    let clock = clock_from(new_york(2024, 6, 3, 10, 0));

    let cancel = CancellationToken::new();
    let handle = MarketRefreshScheduler::new(service, &config)
        .with_clock(clock)
        .spawn(cancel.clone());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(stub.calls(), 2);

    tokio::time::sleep(Duration::from_secs(3500)).await;
    assert_eq!(stub.calls(), 2);

    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(stub.calls(), 4);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_closed_market_never_refreshes() {
    let (service, stub, config) = setup(&["AAA"]).await;
    // 2024-06-08 (토) 12:00 뉴욕
    let clock = clock_from(new_york(2024, 6, 8, 12, 0));

    let cancel = CancellationToken::new();
    let handle = MarketRefreshScheduler::new(service, &config)
        .with_clock(clock)
        .spawn(cancel.clone());

    tokio::time::sleep(Duration::from_secs(6 * 3600)).await;
    assert_eq!(stub.calls(), 0);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_sleep() {
    let (service, _stub, config) = setup(&[]).await;
    let clock = clock_from(new_york(2024, 6, 8, 12, 0));

    let cancel = CancellationToken::new();
    let handle = MarketRefreshScheduler::new(service, &config)
        .with_clock(clock)
        .spawn(cancel.clone());

    tokio::time::sleep(Duration::from_secs(5)).await;
    cancel.cancel();

    let started = tokio::time::Instant::now();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_cancelled_batch_stops_early() {
    let (service, stub, config) = setup(&["AAA", "BBB", "CCC"]).await;
    let scheduler = MarketRefreshScheduler::new(service, &config);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let stats = scheduler.refresh_tracked(&cancel).await.unwrap();
    assert_eq!(stats.total, 0);
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn test_batch_refreshes_tracked_tickers() {
    let (service, stub, config) = setup(&["AAA", "BBB"]).await;
    let scheduler = MarketRefreshScheduler::new(service, &config);

    let stats = scheduler
        .refresh_tracked(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.rows_written, 10);
    assert_eq!(stub.calls(), 2);
}
