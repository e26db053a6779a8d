//! 지표 파라미터와 워밍업 길이.

use serde::{Deserialize, Serialize};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaParams {
    pub period: usize,
}

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerParams {
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0)
    pub multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

/// 시그널 행 하나를 만드는 지표 묶음.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi: RsiParams,
    pub macd: MacdParams,
    pub ema_fast: EmaParams,
    pub ema_slow: EmaParams,
    pub bollinger: BollingerParams,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi: RsiParams::default(),
            macd: MacdParams::default(),
            ema_fast: EmaParams { period: 20 },
            ema_slow: EmaParams { period: 50 },
            bollinger: BollingerParams::default(),
        }
    }
}

impl IndicatorParams {
    /// RSI는 변화량이 `period`개 필요하므로 봉은 하나 더 필요.
    pub fn rsi_warmup(&self) -> usize {
        self.rsi.period + 1
    }

    /// 느린 EMA가 찬 뒤 시그널선 EMA가 다시 채워져야 함.
    pub fn macd_warmup(&self) -> usize {
        self.macd.slow_period + self.macd.signal_period - 1
    }

    /// 모든 지표가 값을 가지는 데 필요한 최소 봉 개수.
    pub fn warmup(&self) -> usize {
        [
            self.rsi_warmup(),
            self.macd_warmup(),
            self.ema_fast.period,
            self.ema_slow.period,
            self.bollinger.period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_warmups() {
        let params = IndicatorParams::default();
        assert_eq!(params.rsi_warmup(), 15);
        assert_eq!(params.macd_warmup(), 34);
        assert_eq!(params.warmup(), 50);
    }
}
