//! Yahoo Finance 가격 Provider.

use async_trait::async_trait;
use chrono::DateTime;
use chronos_core::{sort_and_dedup_rows, OhlcvRow};
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

use super::PriceProvider;
use crate::error::{DataError, Result};

/// Yahoo Finance 차트 API 어댑터.
pub struct YahooPriceProvider {
    connector: yahoo::YahooConnector,
}

impl YahooPriceProvider {
    /// 레지스트리 등록 이름.
    pub const NAME: &'static str = "yahoo";

    /// 새로운 Yahoo Finance Provider 생성.
    pub fn new() -> Result<Self> {
        let connector = yahoo::YahooConnector::new()
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance 연결 실패: {}", e)))?;

        Ok(Self { connector })
    }

    /// 간격에 따른 조회 기간.
    ///
    /// 일봉은 가장 긴 지표 워밍업(50봉)을 넉넉히 넘도록 2년을 가져옵니다.
    pub fn range_for_interval(interval: &str) -> &'static str {
        match interval {
            "1m" | "2m" | "5m" => "5d",
            "15m" | "30m" | "60m" | "90m" | "1h" => "1mo",
            "1d" => "2y",
            "5d" | "1wk" => "5y",
            "1mo" | "3mo" => "10y",
            _ => "1y",
        }
    }
}

#[async_trait]
impl PriceProvider for YahooPriceProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn fetch_ohlcv_rows(&self, ticker: &str, interval: &str) -> Result<Vec<OhlcvRow>> {
        let range = Self::range_for_interval(interval);

        debug!(ticker, interval, range, "Yahoo Finance 시세 요청");

        let response = self
            .connector
            .get_quote_range(ticker, interval, range)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", ticker, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류: {}", e)))?;

        if quotes.is_empty() {
            warn!(ticker, "Yahoo Finance: 데이터 없음");
            return Ok(Vec::new());
        }

        let mut rows: Vec<OhlcvRow> = quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(OhlcvRow {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: i64::try_from(q.volume).ok(),
                })
            })
            .collect();

        // 분봉은 같은 날짜 키로 합쳐지므로 마지막 봉을 남김
        sort_and_dedup_rows(&mut rows);

        debug!(ticker, count = rows.len(), "Yahoo Finance: 봉 수신");

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_for_interval() {
        assert_eq!(YahooPriceProvider::range_for_interval("1d"), "2y");
        assert_eq!(YahooPriceProvider::range_for_interval("1wk"), "5y");
        assert_eq!(YahooPriceProvider::range_for_interval("15m"), "1mo");
        assert_eq!(YahooPriceProvider::range_for_interval("weird"), "1y");
    }
}
