//! OHLCV → 시그널 행 변환.

use chronos_core::{sort_and_dedup_rows, OhlcvRow, SignalRow};
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, MovingAverageConvergenceDivergence,
    RelativeStrengthIndex,
};
use ta::Next;
use tracing::debug;

use super::{IndicatorParams, IndicatorResult};

/// 종가 시계열로 지표 행을 계산합니다.
///
/// 입력은 날짜순으로 다시 정렬되며(중복 날짜는 마지막 값), 출력은 모든 지표가
/// 워밍업된 날짜들의 접미 구간입니다. 봉이 `params.warmup()`보다 적으면 빈 Vec.
///
/// 종가가 NaN/inf인 봉은 지표에 들어가기 전에 버리며, 값이 하나라도 비는
/// 행은 출력하지 않습니다.
pub fn compute_signal_rows(
    rows: &[OhlcvRow],
    params: &IndicatorParams,
) -> IndicatorResult<Vec<SignalRow>> {
    let mut rows = rows.to_vec();
    sort_and_dedup_rows(&mut rows);

    let before = rows.len();
    rows.retain(|row| row.close.is_finite());
    if rows.len() < before {
        debug!(skipped = before - rows.len(), "유한하지 않은 종가 봉 제외");
    }

    let mut rsi = RelativeStrengthIndex::new(params.rsi.period)?;
    let mut macd = MovingAverageConvergenceDivergence::new(
        params.macd.fast_period,
        params.macd.slow_period,
        params.macd.signal_period,
    )?;
    let mut ema_fast = ExponentialMovingAverage::new(params.ema_fast.period)?;
    let mut ema_slow = ExponentialMovingAverage::new(params.ema_slow.period)?;
    let mut bollinger = BollingerBands::new(params.bollinger.period, params.bollinger.multiplier)?;

    let warmup = params.warmup();
    let mut out = Vec::with_capacity((rows.len() + 1).saturating_sub(warmup));

    for (i, row) in rows.iter().enumerate() {
        // 워밍업 구간에서도 모든 지표에 값을 먹여야 상태가 쌓임
        let close = row.close;
        let rsi_value = rsi.next(close);
        let macd_value = macd.next(close);
        let ema_fast_value = ema_fast.next(close);
        let ema_slow_value = ema_slow.next(close);
        let bands = bollinger.next(close);

        if i + 1 < warmup {
            continue;
        }

        let signal = SignalRow {
            date: row.date,
            rsi: finite(rsi_value),
            macd: finite(macd_value.macd),
            macd_signal: finite(macd_value.signal),
            ema_20: finite(ema_fast_value),
            ema_50: finite(ema_slow_value),
            bb_upper: finite(bands.upper),
            bb_lower: finite(bands.lower),
        };

        if signal.is_complete() {
            out.push(signal);
        }
    }

    Ok(out)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
