//! 거래소 정규장 시간 판정.
//!
//! 주말과 고정 현지 시간 구간 `[open, close)`만 봅니다. 휴장일 달력은 없습니다.

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::MarketConfig;
use crate::error::ChronosError;

/// 거래소 타임존과 정규장 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketHours {
    pub timezone: Tz,
    /// 자정 기준 분 단위 시작 시각 (포함)
    pub open_minutes: u32,
    /// 자정 기준 분 단위 종료 시각 (미포함)
    pub close_minutes: u32,
}

impl Default for MarketHours {
    /// 미국 정규장 (America/New_York 09:30–16:00).
    fn default() -> Self {
        Self {
            timezone: chrono_tz::America::New_York,
            open_minutes: 9 * 60 + 30,
            close_minutes: 16 * 60,
        }
    }
}

impl MarketHours {
    /// `[market]` 설정 섹션에서 생성합니다.
    pub fn from_config(config: &MarketConfig) -> Result<Self, ChronosError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|e| ChronosError::Config(format!("invalid market timezone: {e}")))?;
        let open_minutes = parse_hhmm(&config.open)?;
        let close_minutes = parse_hhmm(&config.close)?;

        if open_minutes >= close_minutes {
            return Err(ChronosError::Config(format!(
                "market open {} must be before close {}",
                config.open, config.close
            )));
        }

        Ok(Self {
            timezone,
            open_minutes,
            close_minutes,
        })
    }

    /// 주어진 UTC 시각에 정규장이 열려 있는지 확인합니다.
    pub fn is_market_open(&self, now: DateTime<Utc>) -> bool {
        let local = now.with_timezone(&self.timezone);

        if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }

        let time_minutes = local.hour() * 60 + local.minute();
        time_minutes >= self.open_minutes && time_minutes < self.close_minutes
    }
}

fn parse_hhmm(value: &str) -> Result<u32, ChronosError> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| ChronosError::Config(format!("invalid market time '{value}': {e}")))?;
    Ok(time.hour() * 60 + time.minute())
}
