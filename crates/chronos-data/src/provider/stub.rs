//! 고정 응답을 돌려주는 Provider.
//!
//! 테스트와 오프라인 실행에서 실제 벤더 대신 사용합니다.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use chronos_core::OhlcvRow;
use parking_lot::Mutex;

use super::PriceProvider;
use crate::error::{DataError, Result};

#[derive(Debug, Clone)]
enum Scripted {
    Rows(Vec<OhlcvRow>),
    Fail(String),
}

/// 티커별로 응답을 미리 지정하는 Provider.
///
/// 지정되지 않은 티커는 빈 결과(데이터 없음)를 반환합니다.
#[derive(Debug)]
pub struct StubProvider {
    name: String,
    responses: Mutex<HashMap<String, Scripted>>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// 티커의 응답 행을 지정합니다.
    pub fn with_rows(self, ticker: &str, rows: Vec<OhlcvRow>) -> Self {
        self.set_rows(ticker, rows);
        self
    }

    /// 티커 조회가 주어진 메시지로 실패하도록 지정합니다.
    pub fn with_failure(self, ticker: &str, message: impl Into<String>) -> Self {
        self.set_failure(ticker, message);
        self
    }

    pub fn set_rows(&self, ticker: &str, rows: Vec<OhlcvRow>) {
        self.responses
            .lock()
            .insert(ticker.to_uppercase(), Scripted::Rows(rows));
    }

    pub fn set_failure(&self, ticker: &str, message: impl Into<String>) {
        self.responses
            .lock()
            .insert(ticker.to_uppercase(), Scripted::Fail(message.into()));
    }

    /// 지금까지의 조회 횟수.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `start`부터 하루 간격으로 완만히 오르내리는 `count`개의 봉을 생성합니다.
    pub fn synthetic_rows(start: NaiveDate, count: usize, base: f64) -> Vec<OhlcvRow> {
        (0..count)
            .map(|i| {
                let x = i as f64;
                let close = base + (x * 0.35).sin() * 4.0 + x * 0.05;
                OhlcvRow {
                    date: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: Some(1_000_000 + i as i64 * 100),
                }
            })
            .collect()
    }
}

#[async_trait]
impl PriceProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_ohlcv_rows(&self, ticker: &str, _interval: &str) -> Result<Vec<OhlcvRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.responses.lock().get(&ticker.to_uppercase()).cloned();

        match scripted {
            Some(Scripted::Rows(rows)) => Ok(rows),
            Some(Scripted::Fail(message)) => Err(DataError::FetchError(message)),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rescripting_replaces_previous_response() {
        let stub = StubProvider::new("stub").with_failure("aapl", "boom");
        assert!(stub.fetch_ohlcv_rows("AAPL", "1d").await.is_err());

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        stub.set_rows("AAPL", StubProvider::synthetic_rows(start, 3, 10.0));
        assert_eq!(stub.fetch_ohlcv_rows("aapl", "1d").await.unwrap().len(), 3);
        assert!(stub.fetch_ohlcv_rows("MSFT", "1d").await.unwrap().is_empty());
        assert_eq!(stub.calls(), 3);
    }

    #[tokio::test]
    async fn test_scripting_survives_panicking_thread() {
        let stub = Arc::new(StubProvider::new("stub"));

        let shared = Arc::clone(&stub);
        let handle = std::thread::spawn(move || {
            shared.set_failure("NVDA", "first");
            panic!("worker died after scripting");
        });
        assert!(handle.join().is_err());

        // 다른 스레드가 죽어도 이후 지정은 그대로 반영됨
        stub.set_failure("NVDA", "second");
        match stub.fetch_ohlcv_rows("NVDA", "1d").await {
            Err(DataError::FetchError(message)) => assert_eq!(message, "second"),
            other => panic!("unexpected response: {other:?}"),
        }
    }
}
