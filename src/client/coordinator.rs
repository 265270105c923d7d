//! Single-flight bookkeeping for access-token refreshes.
//!
//! The coordinator owns the in-flight flag and the FIFO queue of waiting
//! requests. It performs no I/O: whoever is admitted as leader runs the
//! refresh and settles the lease; everyone admitted meanwhile gets a ticket
//! that resolves with the leader's outcome.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::oneshot;
use tracing::warn;

use super::error::ApiError;

/// The new access token, or the error every waiter is rejected with.
pub type RefreshResult = Result<String, ApiError>;

#[derive(Default)]
struct CoordinatorState {
    refreshing: bool,
    queue: VecDeque<oneshot::Sender<RefreshResult>>,
    refreshes_started: u64,
}

/// One instance per dispatcher. The flag and queue only change together,
/// under the same lock, so the queue is never non-empty while idle.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<CoordinatorState>,
}

/// Outcome of asking to refresh.
pub enum Admission<'a> {
    /// No refresh was running; the caller must run it and settle the lease.
    Leader(RefreshLease<'a>),
    /// A refresh is already running; wait on the ticket.
    Follower(PendingTicket),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-set of the in-flight flag, or enqueue behind the running refresh.
    pub fn admit(&self) -> Admission<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (sender, receiver) = oneshot::channel();
            state.queue.push_back(sender);
            Admission::Follower(PendingTicket { receiver })
        } else {
            state.refreshing = true;
            state.refreshes_started += 1;
            Admission::Leader(RefreshLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of requests currently waiting on the running refresh.
    pub fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// How many refreshes have been started over the coordinator's lifetime.
    pub fn refreshes_started(&self) -> u64 {
        self.lock().refreshes_started
    }

    fn settle(&self, outcome: RefreshResult) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };
        let count = waiters.len();
        for waiter in waiters {
            // A waiter whose request was dropped has nobody left to tell.
            let _ = waiter.send(outcome.clone());
        }
        count
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Proof of leadership over the running refresh.
///
/// Dropping an unsettled lease (the leader was cancelled or panicked) rejects
/// every waiter with `RefreshAborted` and clears the flag.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Clears the flag and resolves every waiter, in enqueue order, with
    /// `outcome`. Returns how many waiters there were.
    pub fn settle(mut self, outcome: RefreshResult) -> usize {
        self.settled = true;
        self.coordinator.settle(outcome)
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let abandoned = self.coordinator.settle(Err(ApiError::RefreshAborted));
            warn!(
                event_name = "client.refresh.aborted",
                event_domain = "client",
                abandoned,
                "token refresh dropped before settling"
            );
        }
    }
}

/// A request parked behind the running refresh.
pub struct PendingTicket {
    receiver: oneshot::Receiver<RefreshResult>,
}

impl PendingTicket {
    pub async fn wait(self) -> RefreshResult {
        self.receiver
            .await
            .unwrap_or(Err(ApiError::RefreshAborted))
    }
}
