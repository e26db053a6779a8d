//! `AppConfig`에서 파생한 갱신/스케줄러 설정.

use std::time::Duration;

use chronos_core::{AppConfig, MarketHours};

use crate::error::{CollectorError, Result};

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 기본 가격 Provider 이름
    pub default_provider: String,
    /// 기본 봉 간격
    pub default_interval: String,
    /// 시그널 Provider 이름
    pub signal_provider: String,
    /// 스케줄러 설정
    pub scheduler: SchedulerSettings,
}

/// 스케줄러 설정
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// 시작 시 스케줄러 실행 여부
    pub enabled: bool,
    /// 장중 갱신 주기
    pub refresh_interval: Duration,
    /// 장중 1회 최대 대기 시간
    pub open_sleep_cap: Duration,
    /// 장 마감 중 대기 시간
    pub closed_sleep: Duration,
    /// `fetching` 상태를 stale로 보는 기준
    pub stale_fetching: chrono::Duration,
    /// 거래소 운영 시간
    pub market_hours: MarketHours,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: Duration::from_secs(3600),
            open_sleep_cap: Duration::from_secs(300),
            closed_sleep: Duration::from_secs(900),
            stale_fetching: chrono::Duration::minutes(30),
            market_hours: MarketHours::default(),
        }
    }
}

impl CollectorConfig {
    /// 애플리케이션 설정에서 생성합니다. 시장 시간 설정이 잘못되면 에러.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let market_hours = MarketHours::from_config(&config.market)
            .map_err(|e| CollectorError::Config(e.to_string()))?;

        if config.scheduler.refresh_interval_secs == 0 {
            return Err(CollectorError::Config(
                "scheduler.refresh_interval_secs는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(Self {
            default_provider: config.refresh.default_provider.clone(),
            default_interval: config.refresh.default_interval.clone(),
            signal_provider: config.refresh.signal_provider.clone(),
            scheduler: SchedulerSettings {
                enabled: config.scheduler.enabled,
                refresh_interval: Duration::from_secs(config.scheduler.refresh_interval_secs),
                open_sleep_cap: Duration::from_secs(config.scheduler.open_sleep_cap_secs),
                closed_sleep: Duration::from_secs(config.scheduler.closed_sleep_secs),
                stale_fetching: chrono::Duration::minutes(config.scheduler.stale_fetching_minutes),
                market_hours,
            },
        })
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            default_provider: "yahoo".to_string(),
            default_interval: "1d".to_string(),
            signal_provider: "ta".to_string(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_app_config() {
        let config = CollectorConfig::from_app_config(&AppConfig::default()).unwrap();
        assert_eq!(config.default_provider, "yahoo");
        assert_eq!(config.scheduler.refresh_interval, Duration::from_secs(3600));
        assert_eq!(config.scheduler.open_sleep_cap, Duration::from_secs(300));
        assert_eq!(config.scheduler.stale_fetching, chrono::Duration::minutes(30));
    }

    #[test]
    fn test_invalid_market_timezone_rejected() {
        let mut app = AppConfig::default();
        app.market.timezone = "Mars/Olympus".to_string();
        assert!(matches!(
            CollectorConfig::from_app_config(&app),
            Err(CollectorError::Config(_))
        ));
    }
}
