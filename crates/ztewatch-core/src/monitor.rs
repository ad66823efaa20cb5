// ── Background polling ──
//
// Owns a Poller inside one task, so cycles run strictly one after another.
// Each finished cycle's snapshot is published on a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::poller::Poller;
use crate::snapshot::Snapshot;

/// Handle to a running polling task.
pub struct Monitor {
    snapshots: watch::Receiver<Option<Arc<Snapshot>>>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Monitor {
    /// Spawn a task that runs `poller` every `interval`, first cycle
    /// immediately. Must be called within a Tokio runtime.
    pub fn start(poller: Poller, interval: Duration) -> Self {
        let (tx, snapshots) = watch::channel(None);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(poller, interval, cancel.clone(), tx));

        Self {
            snapshots,
            cancel,
            handle,
        }
    }

    /// Receiver that yields every published snapshot (`None` until the
    /// first cycle completes).
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.snapshots.clone()
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.borrow().clone()
    }

    /// Stop polling. A cycle in flight is abandoned.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
        debug!("monitor stopped");
    }
}

async fn poll_task(
    mut poller: Poller,
    interval: Duration,
    cancel: CancellationToken,
    tx: watch::Sender<Option<Arc<Snapshot>>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let snapshot = tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    snapshot = poller.run_cycle() => snapshot,
                };
                tx.send_replace(Some(Arc::new(snapshot)));
            }
        }
    }
}
