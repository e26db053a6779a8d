//! 종목 단위 가격 갱신.
//!
//! 한 번의 갱신은 다음 순서로 진행됩니다:
//! 1. 종목 조회/생성
//! 2. 캐시 상태 `fetching`
//! 3. Provider 조회 후 봉 upsert
//! 4. 캐시 상태 `fresh`, 실패 시 `error` + 에러 메시지 기록 후 원래 에러 반환
//!
//! 2~4 사이에 프로세스가 죽으면 다음 시도 전까지 `fetching`이 남습니다.

use std::sync::Arc;
use std::time::Instant;

use chronos_analytics::{compute_and_upsert_signals, SignalProviderRegistry};
use chronos_core::CacheStatus;
use chronos_data::{ProviderRegistry, Store};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn, Instrument};

use crate::error::Result;
use crate::stats::RefreshStats;

/// 한 종목 갱신 결과.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshResult {
    pub ticker: String,
    pub provider: String,
    pub interval: String,
    pub rows_written: usize,
    pub status: CacheStatus,
    pub detail: Option<String>,
}

impl RefreshResult {
    /// 배치 처리에서 실패를 결과로 기록할 때 사용합니다.
    pub fn failed(ticker: &str, provider: &str, interval: &str, detail: String) -> Self {
        Self {
            ticker: ticker.to_string(),
            provider: provider.to_string(),
            interval: interval.to_string(),
            rows_written: 0,
            status: CacheStatus::Error,
            detail: Some(detail),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CacheStatus::Error
    }
}

/// 저장소와 Provider 레지스트리를 묶은 갱신 서비스.
#[derive(Clone)]
pub struct RefreshService {
    store: Arc<dyn Store>,
    providers: Arc<ProviderRegistry>,
    signals: Arc<SignalProviderRegistry>,
    signal_provider: String,
}

impl RefreshService {
    pub fn new(
        store: Arc<dyn Store>,
        providers: ProviderRegistry,
        signals: SignalProviderRegistry,
        signal_provider: impl Into<String>,
    ) -> Self {
        Self {
            store,
            providers: Arc::new(providers),
            signals: Arc::new(signals),
            signal_provider: signal_provider.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn signal_provider_name(&self) -> &str {
        &self.signal_provider
    }

    /// 한 종목의 가격을 갱신합니다.
    ///
    /// Provider 조회나 저장이 실패하면 캐시 상태에 `error`와 메시지를 남긴 뒤
    /// 원래 에러를 그대로 반환합니다. 데이터가 없는 경우는 성공(`fresh`, 0행)입니다.
    #[instrument(skip(self))]
    pub async fn refresh_stock_prices(
        &self,
        ticker: &str,
        provider: &str,
        interval: &str,
    ) -> Result<RefreshResult> {
        let stock = self.store.get_or_create_stock(ticker).await?;

        self.store
            .upsert_cache_status(stock.id, provider, interval, CacheStatus::Fetching, None)
            .await?;

        match self
            .fetch_and_store(stock.id, &stock.ticker, provider, interval)
            .await
        {
            Ok(rows_written) => {
                let record = self
                    .store
                    .upsert_cache_status(stock.id, provider, interval, CacheStatus::Fresh, None)
                    .await?;

                info!(ticker = %stock.ticker, rows_written, "가격 갱신 완료");

                Ok(RefreshResult {
                    ticker: stock.ticker,
                    provider: provider.to_string(),
                    interval: interval.to_string(),
                    rows_written,
                    status: record.status,
                    detail: record.detail,
                })
            }
            Err(e) => {
                warn!(ticker = %stock.ticker, error = %e, "가격 갱신 실패");

                if let Err(status_err) = self
                    .store
                    .upsert_cache_status(
                        stock.id,
                        provider,
                        interval,
                        CacheStatus::Error,
                        Some(e.to_string()),
                    )
                    .await
                {
                    error!(ticker = %stock.ticker, error = %status_err, "캐시 에러 상태 기록 실패");
                }

                Err(e.into())
            }
        }
    }

    async fn fetch_and_store(
        &self,
        stock_id: i64,
        ticker: &str,
        provider: &str,
        interval: &str,
    ) -> chronos_data::Result<usize> {
        let price_provider = self.providers.get(provider)?;
        let rows = price_provider.fetch_ohlcv_rows(ticker, interval).await?;

        if rows.is_empty() {
            debug!(ticker, "Provider 데이터 없음");
            return Ok(0);
        }

        self.store
            .upsert_ohlcv(stock_id, provider, interval, &rows)
            .await
    }

    /// 저장된 봉으로 시그널을 다시 계산합니다.
    pub async fn recompute_signals(
        &self,
        stock_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<usize> {
        let signal_provider = self.signals.get(&self.signal_provider)?;
        let written = compute_and_upsert_signals(
            self.store.as_ref(),
            stock_id,
            provider,
            interval,
            signal_provider.as_ref(),
        )
        .await?;
        Ok(written)
    }

    /// 가격 갱신 후 시그널을 재계산합니다.
    ///
    /// 시그널 계산 실패는 로그만 남기고 0으로 처리합니다.
    pub async fn refresh_and_compute(
        &self,
        ticker: &str,
        provider: &str,
        interval: &str,
    ) -> Result<(RefreshResult, usize)> {
        let result = self.refresh_stock_prices(ticker, provider, interval).await?;

        let signals_written = match self.store.get_stock_by_ticker(&result.ticker).await? {
            Some(stock) => match self.recompute_signals(stock.id, provider, interval).await {
                Ok(n) => n,
                Err(e) => {
                    warn!(ticker = %result.ticker, error = %e, "시그널 계산 실패");
                    0
                }
            },
            None => 0,
        };

        Ok((result, signals_written))
    }

    /// 유니버스 소속 종목을 순차 갱신합니다.
    ///
    /// 종목별 실패는 `error` 결과로 기록되고 배치는 계속 진행됩니다.
    /// 성공한 종목은 시그널도 재계산합니다.
    #[instrument(skip(self))]
    pub async fn refresh_universe_tickers(
        &self,
        universe_id: i64,
        provider: &str,
        interval: &str,
    ) -> Result<Vec<RefreshResult>> {
        let members = self.store.list_members(universe_id).await?;
        let mut results = Vec::with_capacity(members.len());

        for stock in members {
            match self.refresh_and_compute(&stock.ticker, provider, interval).await {
                Ok((result, _)) => results.push(result),
                Err(e) => {
                    results.push(RefreshResult::failed(
                        &stock.ticker,
                        provider,
                        interval,
                        e.to_string(),
                    ));
                }
            }
        }

        Ok(results)
    }

    /// 주어진 티커 목록을 순차 갱신합니다 (CLI `refresh`).
    pub async fn refresh_tickers(
        &self,
        tickers: &[String],
        provider: &str,
        interval: &str,
    ) -> RefreshStats {
        let started = Instant::now();
        let mut stats = RefreshStats::new();

        for ticker in tickers {
            let span = chronos_core::refresh_span!("refresh_ticker", ticker, provider, interval);
            match self
                .refresh_and_compute(ticker, provider, interval)
                .instrument(span)
                .await
            {
                Ok((result, signals)) => stats.record_success(result.rows_written, signals),
                Err(e) => {
                    error!(ticker = %ticker, error = %e, "갱신 실패");
                    stats.record_error();
                }
            }
        }

        stats.elapsed = started.elapsed();
        stats
    }

    /// 추적 중인 모든 종목의 시그널을 재계산합니다 (CLI `signals`).
    pub async fn recompute_all_signals(&self, provider: &str, interval: &str) -> Result<RefreshStats> {
        let started = Instant::now();
        let mut stats = RefreshStats::new();

        for stock in self.store.list_tracked_stocks().await? {
            match self.recompute_signals(stock.id, provider, interval).await {
                Ok(written) => stats.record_success(0, written),
                Err(e) => {
                    error!(ticker = %stock.ticker, error = %e, "시그널 계산 실패");
                    stats.record_error();
                }
            }
        }

        stats.elapsed = started.elapsed();
        Ok(stats)
    }
}

impl std::fmt::Debug for RefreshService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshService")
            .field("backend", &self.store.backend())
            .field("providers", &self.providers.names())
            .field("signal_provider", &self.signal_provider)
            .finish()
    }
}
