//! Indicator engine: interval gains/losses and the first-window RSI.

pub mod gain_loss;
pub mod rsi;

pub use gain_loss::GainLoss;
pub use rsi::{Rsi, DEFAULT_PERIOD};

/// Create validated records from close prices for testing.
///
/// open = prev_close (or close for the first record),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_records(closes: &[f64]) -> Vec<crate::domain::ValidatedRecord> {
    use crate::domain::ValidatedRecord;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            ValidatedRecord {
                date: (base_date + chrono::Duration::days(i as i64)).to_string(),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
