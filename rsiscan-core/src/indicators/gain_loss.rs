//! Per-interval gains and losses from consecutive closing prices.
//!
//! For closes `c[0..n]`, interval `i` has delta `c[i+1] - c[i]`:
//! a rise is a gain, a fall is a loss (as a positive magnitude), no change is
//! zero in both. Both series have length `n - 1` (empty when `n <= 1`).

use crate::domain::ValidatedRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GainLoss {
    pub gain: Vec<f64>,
    pub loss: Vec<f64>,
}

impl GainLoss {
    pub fn from_closes(closes: &[f64]) -> Self {
        let (gain, loss) = closes
            .windows(2)
            .map(|w| {
                let delta = w[1] - w[0];
                if delta > 0.0 {
                    (delta, 0.0)
                } else if delta < 0.0 {
                    (0.0, -delta)
                } else {
                    (0.0, 0.0)
                }
            })
            .unzip();
        Self { gain, loss }
    }

    pub fn from_records(records: &[ValidatedRecord]) -> Self {
        let closes: Vec<f64> = records.iter().map(|r| r.close).collect();
        Self::from_closes(&closes)
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.gain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gain.is_empty()
    }
}
