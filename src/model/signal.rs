use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    /// One of the averages has no value yet at the latest point.
    Insufficient,
}

impl Signal {
    pub fn label(&self) -> &'static str {
        match self {
            Signal::Buy => "Buy",
            Signal::Sell => "Sell",
            Signal::Hold => "Hold",
            Signal::Insufficient => "Not enough data for signal",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Averages and decision at the most recent observation of a filtered series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalState {
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub signal: Signal,
}

impl SignalState {
    pub fn insufficient() -> Self {
        Self {
            sma_fast: None,
            sma_slow: None,
            signal: Signal::Insufficient,
        }
    }
}
