//! (종목, provider, interval)별 가격 캐시 상태.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 캐시 수명주기: `unknown → fetching → fresh | error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Unknown,
    Fetching,
    Fresh,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Unknown => "unknown",
            CacheStatus::Fetching => "fetching",
            CacheStatus::Fresh => "fresh",
            CacheStatus::Error => "error",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(Self::Unknown),
            "fetching" => Ok(Self::Fetching),
            "fresh" => Ok(Self::Fresh),
            "error" => Ok(Self::Error),
            other => Err(format!("Unknown cache status: {}", other)),
        }
    }
}

/// 캐시 상태 행. 키당 현재 상태 하나만 유지됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub stock_id: i64,
    pub provider: String,
    pub interval: String,
    pub status: CacheStatus,
    /// 마지막 기록 시각 (모든 upsert에서 갱신)
    pub last_fetched_at: DateTime<Utc>,
    pub detail: Option<String>,
}

impl CacheRecord {
    /// `fetching` 상태가 `max_age`보다 오래 유지되었는지 확인합니다.
    ///
    /// 갱신 도중 프로세스가 죽으면 다음 시도 전까지 `fetching`으로 남습니다.
    pub fn is_stale_fetching(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.status == CacheStatus::Fetching && now - self.last_fetched_at > max_age
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: CacheStatus, minutes_ago: i64, now: DateTime<Utc>) -> CacheRecord {
        CacheRecord {
            stock_id: 1,
            provider: "yahoo".into(),
            interval: "1d".into(),
            status,
            last_fetched_at: now - Duration::minutes(minutes_ago),
            detail: None,
        }
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [
            CacheStatus::Unknown,
            CacheStatus::Fetching,
            CacheStatus::Fresh,
            CacheStatus::Error,
        ] {
            assert_eq!(status.as_str().parse::<CacheStatus>().unwrap(), status);
        }
        assert!("stale".parse::<CacheStatus>().is_err());
    }

    #[test]
    fn test_stale_fetching() {
        let now = Utc::now();
        let max_age = Duration::minutes(30);

        assert!(record(CacheStatus::Fetching, 45, now).is_stale_fetching(now, max_age));
        assert!(!record(CacheStatus::Fetching, 5, now).is_stale_fetching(now, max_age));
        assert!(!record(CacheStatus::Fresh, 45, now).is_stale_fetching(now, max_age));
    }
}
