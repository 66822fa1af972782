use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Which repeating timer fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTick {
    /// Fast cadence: market-price refresh.
    Market,
    /// Slow cadence: portfolio/position/trade refresh.
    Portfolio,
}

/// Owns the two independent repeating refresh timers.
///
/// Each timer re-arms after firing and sends a [`RefreshTick`] over the
/// channel handed to [`start`](Self::start); the owner applies the actual
/// refresh on its own control thread, so overlapping fires are harmless —
/// every fetch cycle is idempotent and stale results are dropped at
/// apply-time by the view controller's ticket check.
pub struct RefreshScheduler {
    market_period: Duration,
    portfolio_period: Duration,
    tasks: Vec<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new(market_period: Duration, portfolio_period: Duration) -> Self {
        Self {
            market_period,
            portfolio_period,
            tasks: Vec::new(),
        }
    }

    /// Arm both timers. Idempotent: calling `start` while running does not
    /// create duplicate timers.
    pub fn start(&mut self, tx: mpsc::UnboundedSender<RefreshTick>) {
        if self.is_running() {
            debug!("refresh scheduler already running, start ignored");
            return;
        }

        self.tasks.push(Self::spawn_timer(
            self.market_period,
            RefreshTick::Market,
            tx.clone(),
        ));
        self.tasks.push(Self::spawn_timer(
            self.portfolio_period,
            RefreshTick::Portfolio,
            tx,
        ));
        debug!(
            market_period_ms = self.market_period.as_millis() as u64,
            portfolio_period_ms = self.portfolio_period.as_millis() as u64,
            "refresh scheduler started"
        );
    }

    /// Cancel all owned timers. Safe to call when already stopped.
    pub fn stop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    fn spawn_timer(
        period: Duration,
        tick: RefreshTick,
        tx: mpsc::UnboundedSender<RefreshTick>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first interval tick completes immediately; skip it so the
            // first send happens one full period after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(tick).is_err() {
                    // Receiver dropped: nobody is listening anymore.
                    return;
                }
            }
        })
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
