use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::event::AppEvent;

/// Allows at most one fetch in flight. A trigger that arrives while a fetch
/// is outstanding is dropped; the next timer tick tries again.
#[derive(Debug, Default)]
pub struct RefreshGate {
    in_flight: bool,
    dropped: u64,
}

impl RefreshGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot. Returns false, and counts a drop, if it is taken.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            self.dropped += 1;
            tracing::debug!(dropped = self.dropped, "Refresh trigger dropped: fetch in flight");
            false
        } else {
            self.in_flight = true;
            true
        }
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Send [`AppEvent::RefreshDue`] now and then every `period` until shutdown
/// or until the receiver goes away.
pub fn spawn_refresh_trigger(
    events: mpsc::Sender<AppEvent>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if events.send(AppEvent::RefreshDue).await.is_err() {
                        break;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::debug!("Refresh trigger stopped");
    })
}
