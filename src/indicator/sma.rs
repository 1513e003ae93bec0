use std::collections::VecDeque;

/// Trailing Simple Moving Average with a running sum.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "SMA period must be > 0");
        Self {
            period,
            window: VecDeque::with_capacity(period),
            sum: 0.0,
        }
    }

    /// Push a new value, return the current SMA once `period` values are in.
    pub fn push(&mut self, value: f64) -> Option<f64> {
        if self.window.len() == self.period {
            if let Some(oldest) = self.window.pop_front() {
                self.sum -= oldest;
            }
        }
        self.window.push_back(value);
        self.sum += value;
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.is_ready() {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }

    pub fn is_ready(&self) -> bool {
        self.window.len() >= self.period
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Trailing mean at every position of `values`; `None` until `period`
/// values have accumulated.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut sma = Sma::new(period);
    values.iter().map(|&v| sma.push(v)).collect()
}

/// Mean of the last `period` values, summed directly.
pub fn trailing_mean(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let tail = &values[values.len() - period..];
    Some(tail.iter().sum::<f64>() / period as f64)
}
