//! OHLCV 봉 데이터.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Provider가 반환하는 정규화된 봉 한 개.
///
/// 저장 키는 (종목, provider, interval, date)이며 같은 키는 덮어씁니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcvRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<i64>,
}

impl OhlcvRow {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// 날짜 오름차순 정렬. 같은 날짜가 여러 번 나오면 마지막 값을 남깁니다.
pub fn sort_and_dedup_rows(rows: &mut Vec<OhlcvRow>) {
    rows.sort_by_key(|r| r.date);
    let mut deduped: Vec<OhlcvRow> = Vec::with_capacity(rows.len());
    for row in rows.drain(..) {
        match deduped.last_mut() {
            Some(last) if last.date == row.date => *last = row,
            _ => deduped.push(row),
        }
    }
    *rows = deduped;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_sort_and_dedup_keeps_last() {
        let mut rows = vec![
            OhlcvRow::new(d(3), 1.0, 1.0, 1.0, 3.0),
            OhlcvRow::new(d(1), 1.0, 1.0, 1.0, 1.0),
            OhlcvRow::new(d(3), 1.0, 1.0, 1.0, 30.0),
        ];
        sort_and_dedup_rows(&mut rows);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, d(1));
        assert_eq!(rows[1].close, 30.0);
    }
}
