//! Fault signal and background connection recovery.
//!
//! One long-lived task owns recovery: it parks on a level-triggered signal,
//! reopens the channel when woken, and retries with a fixed delay until the
//! open succeeds or shutdown stops it. RPC callers never wait on this path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::channel::MessageChannel;

/// Fixed delay between reopen attempts.
pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Level-triggered fault notification.
///
/// Any number of raises collapse into one pending wake; [`FaultSignal::wait`]
/// clears the pending state atomically before returning, so the worker only
/// learns "at least one fault happened since last check".
#[derive(Debug, Default)]
pub struct FaultSignal {
    pending: AtomicBool,
    notify: Notify,
}

impl FaultSignal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Record a fault and wake the recovery worker.
    pub fn raise(&self) {
        self.pending.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Park until at least one fault has been raised since the last wait.
    pub async fn wait(&self) {
        loop {
            if self.pending.swap(false, Ordering::SeqCst) {
                return;
            }
            self.notify.notified().await;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }
}

/// Background worker that reopens the channel whenever a fault is raised.
///
/// Reopen failures retry forever; only [`RecoveryWorker::shutdown`] stops the
/// worker.
pub struct RecoveryWorker {
    running: Arc<AtomicBool>,
    signal: Arc<FaultSignal>,
    handle: JoinHandle<()>,
}

impl RecoveryWorker {
    /// Spawn the recovery task. Production callers pass [`RETRY_DELAY`].
    pub fn spawn(
        channel: Arc<dyn MessageChannel>,
        signal: Arc<FaultSignal>,
        retry_delay: Duration,
    ) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(recovery_loop(
            channel,
            Arc::clone(&signal),
            Arc::clone(&running),
            retry_delay,
        ));
        Self {
            running,
            signal,
            handle,
        }
    }

    /// Stop the worker and wait until its task has fully exited.
    ///
    /// The worker observes the cleared running flag before any further reopen
    /// attempt. Precondition: in-flight RPC operations have drained.
    pub async fn shutdown(self) {
        self.running.store(false, Ordering::SeqCst);
        self.signal.raise();
        if let Err(error) = self.handle.await {
            tracing::error!(%error, "recovery worker task failed");
        }
    }
}

async fn recovery_loop(
    channel: Arc<dyn MessageChannel>,
    signal: Arc<FaultSignal>,
    running: Arc<AtomicBool>,
    retry_delay: Duration,
) {
    loop {
        signal.wait().await;
        if !running.load(Ordering::SeqCst) {
            break;
        }

        match channel.open().await {
            Ok(()) => tracing::info!("channel reopened"),
            Err(error) => {
                tracing::error!(%error, "failed to reopen channel");
                tokio::time::sleep(retry_delay).await;
                if running.load(Ordering::SeqCst) {
                    // Re-arm so the next wait retries without an external fault.
                    signal.raise();
                }
            }
        }
    }
    tracing::debug!("recovery worker exiting");
}
