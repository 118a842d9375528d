use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Runs a job every `period` on a background task until stopped.
///
/// The first run happens one full period after spawning. Runs never
/// overlap: a job that outlasts the period delays the next tick. Dropping
/// the `Poller` stops the task as well.
pub struct Poller {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }
                // A hung job must not keep the poller alive after stop
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = job() => {}
                }
            }
            debug!("poller stopped");
        });
        Self { stop_tx: Some(stop_tx), handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Signals the task and waits for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(period: Duration) -> (Poller, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let poller = Poller::spawn(period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (poller, runs)
    }

    #[tokio::test(start_paused = true)]
    async fn first_run_waits_one_period() {
        let (poller, runs) = counting(Duration::from_millis(2000));
        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        tokio::time::sleep(Duration::from_millis(4000)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        poller.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn stop_ends_the_task() {
        let (poller, runs) = counting(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(poller.is_running());
        poller.stop().await;
        let seen = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_a_hung_job() {
        let poller = Poller::spawn(Duration::from_millis(10), || std::future::pending::<()>());
        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.stop().await;
    }
}
