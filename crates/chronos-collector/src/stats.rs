//! 갱신 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 갱신 배치 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshStats {
    /// 총 시도 횟수
    pub total: usize,
    /// 성공 횟수
    pub success: usize,
    /// 에러 횟수
    pub errors: usize,
    /// 빈 데이터 (조회 성공, 데이터 없음)
    pub empty: usize,
    /// 저장된 총 봉 수
    pub rows_written: usize,
    /// 저장된 총 시그널 행 수
    pub signals_written: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RefreshStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 성공한 갱신 하나를 기록합니다.
    pub fn record_success(&mut self, rows_written: usize, signals_written: usize) {
        self.total += 1;
        self.success += 1;
        if rows_written == 0 {
            self.empty += 1;
        }
        self.rows_written += rows_written;
        self.signals_written += signals_written;
    }

    pub fn record_error(&mut self) {
        self.total += 1;
        self.errors += 1;
    }

    /// 성공률 계산 (%)
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            empty = self.empty,
            rows_written = self.rows_written,
            signals_written = self.signals_written,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_rate() {
        let mut stats = RefreshStats::new();
        assert_eq!(stats.success_rate(), 0.0);

        stats.record_success(10, 3);
        stats.record_success(0, 0);
        stats.record_error();
        stats.record_error();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.empty, 1);
        assert_eq!(stats.rows_written, 10);
        assert_eq!(stats.signals_written, 3);
        assert!((stats.success_rate() - 50.0).abs() < f64::EPSILON);
    }
}
