use crate::indicator::sma::{rolling_mean, trailing_mean};
use crate::model::series::Series;
use crate::model::signal::{Signal, SignalState};

pub const DEFAULT_FAST_PERIOD: usize = 5;
pub const DEFAULT_SLOW_PERIOD: usize = 15;

/// Two-average crossover evaluated at the latest point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaCrossover {
    fast_period: usize,
    slow_period: usize,
}

impl Default for MaCrossover {
    fn default() -> Self {
        Self::new(DEFAULT_FAST_PERIOD, DEFAULT_SLOW_PERIOD)
    }
}

impl MaCrossover {
    pub fn new(fast_period: usize, slow_period: usize) -> Self {
        assert!(fast_period > 0, "fast_period must be > 0");
        assert!(
            fast_period < slow_period,
            "fast_period must be less than slow_period"
        );
        Self {
            fast_period,
            slow_period,
        }
    }

    pub fn fast_period(&self) -> usize {
        self.fast_period
    }

    pub fn slow_period(&self) -> usize {
        self.slow_period
    }

    /// Averages and signal at the last point. An empty series reports
    /// `Insufficient`; callers are expected to short-circuit before that.
    pub fn compute(&self, series: &Series) -> SignalState {
        let prices = series.prices();
        let sma_fast = trailing_mean(&prices, self.fast_period);
        let sma_slow = trailing_mean(&prices, self.slow_period);
        SignalState {
            sma_fast,
            sma_slow,
            signal: decide(sma_fast, sma_slow),
        }
    }

    /// Per-point fast and slow averages, for chart overlays.
    pub fn overlays(&self, series: &Series) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let prices = series.prices();
        (
            rolling_mean(&prices, self.fast_period),
            rolling_mean(&prices, self.slow_period),
        )
    }
}

pub fn decide(fast: Option<f64>, slow: Option<f64>) -> Signal {
    match (fast, slow) {
        (Some(f), Some(s)) if f > s => Signal::Buy,
        (Some(f), Some(s)) if f < s => Signal::Sell,
        (Some(_), Some(_)) => Signal::Hold,
        _ => Signal::Insufficient,
    }
}
