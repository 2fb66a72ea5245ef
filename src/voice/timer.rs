use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Periodic tick source owned by exactly one call.
///
/// Dropping the timer aborts its task, so replacing or clearing the
/// controller's `Option<CallTimer>` cancels it.
pub struct CallTimer {
    handle: JoinHandle<()>,
}

impl CallTimer {
    pub const PERIOD: Duration = Duration::from_secs(1);

    /// Run `on_tick` once per `period`, first after one full period. The
    /// timer stops itself when `on_tick` returns `false`.
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                if !on_tick() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CallTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
