//! 장중 가격 갱신 스케줄러.
//!
//! 부팅 시 하나의 태스크로 시작하고 `CancellationToken`으로 종료합니다.
//! 장이 열려 있고 갱신 주기가 지났으면 유니버스에 속한 모든 종목을
//! 순차 갱신하고 시그널을 재계산합니다. 대기는 항상 취소 신호와 경합합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{CollectorConfig, SchedulerSettings};
use crate::error::Result;
use crate::refresh::RefreshService;
use crate::stats::RefreshStats;

/// 현재 UTC 시각을 돌려주는 시계. 테스트에서 교체합니다.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

const MIN_SLEEP: Duration = Duration::from_secs(1);

/// 장중 갱신 스케줄러.
pub struct MarketRefreshScheduler {
    service: RefreshService,
    settings: SchedulerSettings,
    provider: String,
    interval: String,
    clock: Clock,
}

impl MarketRefreshScheduler {
    pub fn new(service: RefreshService, config: &CollectorConfig) -> Self {
        Self {
            service,
            settings: config.scheduler.clone(),
            provider: config.default_provider.clone(),
            interval: config.default_interval.clone(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// 스케줄러를 백그라운드 태스크로 시작합니다.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// 취소될 때까지 루프를 실행합니다.
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            provider = %self.provider,
            interval = %self.interval,
            refresh_secs = self.settings.refresh_interval.as_secs(),
            "장중 갱신 스케줄러 시작"
        );

        let mut last_refresh: Option<Instant> = None;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let open = self.settings.market_hours.is_market_open((self.clock)());

            if open && self.is_due(last_refresh) {
                let started = Instant::now();
                match self.refresh_tracked(&cancel).await {
                    Ok(mut stats) => {
                        stats.elapsed = started.elapsed();
                        stats.log_summary("장중 가격 갱신");
                    }
                    Err(e) => error!(error = %e, "장중 갱신 배치 실패, 이번 주기 건너뜀"),
                }
                last_refresh = Some(Instant::now());
            }

            let sleep = self.next_sleep(open, last_refresh);
            debug!(market_open = open, sleep_secs = sleep.as_secs(), "다음 확인까지 대기");

            tokio::select! {
                _ = tokio::time::sleep(sleep) => {}
                _ = cancel.cancelled() => {
                    info!("장중 갱신 스케줄러: 종료 시그널 수신");
                    break;
                }
            }
        }

        info!("장중 갱신 스케줄러 종료됨");
    }

    /// 추적 중인 모든 종목을 한 번 갱신합니다.
    ///
    /// 종목 사이마다 취소 여부를 확인하고, 취소되면 남은 종목은 건너뜁니다.
    pub async fn refresh_tracked(&self, cancel: &CancellationToken) -> Result<RefreshStats> {
        let stocks = self.service.store().list_tracked_stocks().await?;
        let mut stats = RefreshStats::new();

        for stock in stocks {
            if cancel.is_cancelled() {
                warn!(processed = stats.total, "취소 신호로 갱신 배치 중단");
                break;
            }

            match self
                .service
                .refresh_and_compute(&stock.ticker, &self.provider, &self.interval)
                .await
            {
                Ok((result, signals)) => stats.record_success(result.rows_written, signals),
                Err(e) => {
                    error!(ticker = %stock.ticker, error = %e, "종목 갱신 실패");
                    stats.record_error();
                }
            }
        }

        Ok(stats)
    }

    fn is_due(&self, last_refresh: Option<Instant>) -> bool {
        match last_refresh {
            None => true,
            Some(at) => at.elapsed() >= self.settings.refresh_interval,
        }
    }

    fn next_sleep(&self, open: bool, last_refresh: Option<Instant>) -> Duration {
        if !open {
            return self.settings.closed_sleep;
        }

        let until_due = match last_refresh {
            None => Duration::ZERO,
            Some(at) => self.settings.refresh_interval.saturating_sub(at.elapsed()),
        };

        until_due.min(self.settings.open_sleep_cap).max(MIN_SLEEP)
    }
}

impl std::fmt::Debug for MarketRefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketRefreshScheduler")
            .field("settings", &self.settings)
            .field("provider", &self.provider)
            .field("interval", &self.interval)
            .finish()
    }
}
