//! 기술적 지표 시그널 행.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 하루치 지표 값. 모든 지표는 값이 없을 수 있습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub date: NaiveDate,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
}

impl SignalRow {
    /// 룰에서 참조 가능한 필드 이름.
    pub const FIELDS: [&'static str; 7] = [
        "rsi",
        "macd",
        "macd_signal",
        "ema_20",
        "ema_50",
        "bb_upper",
        "bb_lower",
    ];

    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    /// 이름으로 지표 값을 조회합니다. 알 수 없는 이름이나 null이면 `None`.
    pub fn field(&self, name: &str) -> Option<f64> {
        match name {
            "rsi" => self.rsi,
            "macd" => self.macd,
            "macd_signal" => self.macd_signal,
            "ema_20" => self.ema_20,
            "ema_50" => self.ema_50,
            "bb_upper" => self.bb_upper,
            "bb_lower" => self.bb_lower,
            _ => None,
        }
    }

    /// 모든 지표가 채워져 있는지 확인합니다.
    pub fn is_complete(&self) -> bool {
        Self::FIELDS.iter().all(|f| self.field(f).is_some())
    }
}
