//! 후보 생성 엔진 통합 테스트 (인메모리 저장소).

use std::sync::Arc;

use chrono::NaiveDate;
use chronos_core::{CandidateStatus, NewTemplate, NewUniverse, SignalRow, TemplateKind};
use chronos_data::{CandidateStore, MemoryStore, SignalStore, StockStore, TemplateStore, UniverseStore};
use chronos_strategy::{CandidateEngine, CandidateError};
use serde_json::{json, Value};

const PROVIDER: &str = "stub";
const INTERVAL: &str = "1d";

struct Fixture {
    store: Arc<MemoryStore>,
    engine: CandidateEngine,
    universe_id: i64,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let universe = store
        .create_universe(NewUniverse {
            name: "watch".into(),
            description: None,
        })
        .await
        .unwrap();
    Fixture {
        engine: CandidateEngine::new(store.clone()),
        store,
        universe_id: universe.id,
    }
}

impl Fixture {
    async fn add_ticker(&self, ticker: &str, rsi: Option<f64>) {
        let stock = self.store.get_or_create_stock(ticker).await.unwrap();
        self.store.add_member(self.universe_id, stock.id).await.unwrap();
        if let Some(rsi) = rsi {
            let older = SignalRow {
                rsi: Some(80.0),
                ..SignalRow::empty(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap())
            };
            let latest = SignalRow {
                rsi: Some(rsi),
                ema_20: Some(101.0),
                ..SignalRow::empty(NaiveDate::from_ymd_opt(2024, 6, 4).unwrap())
            };
            self.store
                .upsert_signals(stock.id, PROVIDER, INTERVAL, &[older, latest])
                .await
                .unwrap();
        }
    }

    async fn template(&self, config: Value) -> i64 {
        self.store
            .create_template(NewTemplate {
                kind: TemplateKind::Screen,
                name: format!("t-{}", config),
                version: 1,
                description: None,
                config_json: config,
            })
            .await
            .unwrap()
            .id
    }
}

#[tokio::test]
async fn test_single_rule_match_creates_one_proposed_candidate() {
    let f = fixture().await;
    f.add_ticker("AAPL", Some(29.3)).await;
    f.add_ticker("MSFT", Some(55.0)).await;
    let template_id = f
        .template(json!({"entry_rules": [{"field": "rsi", "op": "lt", "value": 35}]}))
        .await;

    let created = f
        .engine
        .generate(f.universe_id, template_id, PROVIDER, INTERVAL)
        .await
        .unwrap();
    assert_eq!(created, 1);

    let candidates = f.store.list_candidates(f.universe_id, None, 100, 0).await.unwrap();
    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.ticker, "AAPL");
    assert_eq!(c.status, CandidateStatus::Proposed);
    assert_eq!(c.reason_code.as_deref(), Some("template_rules_passed"));
    assert_eq!(c.payload_json["template_id"], template_id);
    assert_eq!(c.payload_json["latest_signal"]["rsi"], 29.3);
    assert_eq!(c.payload_json["latest_signal"]["date"], "2024-06-04");
    assert_eq!(
        c.payload_json["applied_rules"],
        json!([{"field": "rsi", "op": "lt", "value": 35}])
    );
}

#[tokio::test]
async fn test_empty_rules_match_every_ticker_with_signals() {
    let f = fixture().await;
    f.add_ticker("AAPL", Some(29.3)).await;
    f.add_ticker("MSFT", Some(55.0)).await;
    f.add_ticker("NOSIG", None).await;

    let plain = f.template(json!({"entry_rules": []})).await;
    assert_eq!(
        f.engine.generate(f.universe_id, plain, PROVIDER, INTERVAL).await.unwrap(),
        2
    );
    let candidates = f.store.list_candidates(f.universe_id, None, 100, 0).await.unwrap();
    assert!(candidates.iter().all(|c| c.score == 0.0));

    let scored = f
        .template(json!({"entry_rules": [], "score_field": "rsi"}))
        .await;
    f.engine
        .generate(f.universe_id, scored, PROVIDER, INTERVAL)
        .await
        .unwrap();
    let candidates = f.store.list_candidates(f.universe_id, None, 100, 0).await.unwrap();
    // 최신 배치가 먼저, 배치 안에서는 점수 내림차순
    assert_eq!(candidates[0].ticker, "MSFT");
    assert_eq!(candidates[0].score, 55.0);
    assert_eq!(candidates[1].score, 29.3);
}

#[tokio::test]
async fn test_repeated_generation_appends_batches() {
    let f = fixture().await;
    f.add_ticker("AAPL", Some(29.3)).await;
    let template_id = f.template(json!({"entry_rules": []})).await;

    for _ in 0..2 {
        f.engine
            .generate(f.universe_id, template_id, PROVIDER, INTERVAL)
            .await
            .unwrap();
    }

    let candidates = f.store.list_candidates(f.universe_id, None, 100, 0).await.unwrap();
    assert_eq!(candidates.len(), 2);
    assert_ne!(candidates[0].id, candidates[1].id);
}

#[tokio::test]
async fn test_unknown_template_is_not_found() {
    let f = fixture().await;
    let err = f
        .engine
        .generate(f.universe_id, 9999, PROVIDER, INTERVAL)
        .await
        .unwrap_err();
    assert!(matches!(err, CandidateError::TemplateNotFound(9999)));
}

#[tokio::test]
async fn test_unknown_operator_fails_closed() {
    let f = fixture().await;
    f.add_ticker("AAPL", Some(10.0)).await;
    let template_id = f
        .template(json!({"entry_rules": [{"field": "rsi", "op": "approx", "value": 10}]}))
        .await;

    assert_eq!(
        f.engine
            .generate(f.universe_id, template_id, PROVIDER, INTERVAL)
            .await
            .unwrap(),
        0
    );
}
