//! Relative Strength Index (RSI), first-window form.
//!
//! Averages the first `period` gains and losses of the whole history (no
//! Wilder smoothing, no trailing window):
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: fewer than `period` intervals → None; avg_loss == 0 → 100.

use crate::domain::ValidatedRecord;
use crate::indicators::gain_loss::GainLoss;

/// Lookback used when none is configured.
pub const DEFAULT_PERIOD: usize = 14;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of intervals required for a value.
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn compute(&self, gl: &GainLoss) -> Option<f64> {
        if gl.gain.len() < self.period || gl.loss.len() < self.period {
            return None;
        }

        let avg_gain = gl.gain[..self.period].iter().sum::<f64>() / self.period as f64;
        let avg_loss = gl.loss[..self.period].iter().sum::<f64>() / self.period as f64;

        Some(compute_rsi(avg_gain, avg_loss))
    }

    pub fn from_records(&self, records: &[ValidatedRecord]) -> Option<f64> {
        self.compute(&GainLoss::from_records(records))
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD)
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss != 0.0 {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    } else {
        100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_records, DEFAULT_EPSILON};

    fn closes(start: f64, step: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[test]
    fn rsi_all_gains() {
        let rsi = Rsi::default();
        let value = rsi.from_records(&make_records(&closes(100.0, 1.0, 20)));
        assert_eq!(value, Some(100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let rsi = Rsi::default();
        let value = rsi.from_records(&make_records(&closes(100.0, -1.0, 20)));
        assert_eq!(value, Some(0.0));
    }

    #[test]
    fn rsi_no_movement_is_100() {
        let gl = GainLoss::from_closes(&[50.0; 15]);
        assert_eq!(Rsi::default().compute(&gl), Some(100.0));
    }

    #[test]
    fn rsi_needs_a_full_window() {
        let rsi = Rsi::default();
        // 14 closes → 13 intervals
        assert_eq!(rsi.compute(&GainLoss::from_closes(&closes(1.0, 1.0, 14))), None);
        // 15 closes → 14 intervals
        assert!(rsi.compute(&GainLoss::from_closes(&closes(1.0, 1.0, 15))).is_some());
    }

    #[test]
    fn rsi_mixed() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // period=3 uses the first three: gains=0.34, losses=0.73
        // RSI = 100 - 100/(1 + 0.34/0.73)
        let gl = GainLoss::from_closes(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let value = Rsi::new(3).compute(&gl).unwrap();
        assert_approx(value, 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_ignores_intervals_after_first_window() {
        let mut series = closes(100.0, 1.0, 15);
        series.extend(closes(113.0, -1.0, 30));
        let gl = GainLoss::from_closes(&series);
        assert_eq!(Rsi::default().compute(&gl), Some(100.0));
    }

    #[test]
    fn rsi_balanced_window_is_50() {
        // Alternating +1/-1 over 14 intervals → equal averages.
        let series: Vec<f64> = (0..15).map(|i| if i % 2 == 0 { 10.0 } else { 11.0 }).collect();
        let value = Rsi::default().compute(&GainLoss::from_closes(&series)).unwrap();
        assert_approx(value, 50.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rsi_name_and_period() {
        let rsi = Rsi::new(9);
        assert_eq!(rsi.name(), "rsi_9");
        assert_eq!(rsi.period(), 9);
        assert_eq!(Rsi::default().period(), DEFAULT_PERIOD);
    }

    #[test]
    #[should_panic(expected = "RSI period must be >= 1")]
    fn rsi_rejects_zero_period() {
        let _ = Rsi::new(0);
    }
}
