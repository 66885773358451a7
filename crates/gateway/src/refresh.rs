//! Single-flight coordination for token reissue.
//!
//! Under concurrent expiry, exactly one caller (the leader) performs the
//! reissue call; everyone else enqueues a continuation and suspends until the
//! leader settles the cycle. All participants of a cycle observe the same
//! outcome, and the flag/queue transitions happen inside one synchronous lock
//! scope, so no caller can slip between the check and the election.

use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

/// Failure of a reissue cycle, fanned out to every participant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// The backend rejected the reissue (session reference gone or invalid).
    #[error("Token reissue rejected ({code}): {message}")]
    Rejected { code: i32, message: String },

    /// The reissue call failed at the transport level.
    #[error("Token reissue transport failure: {0}")]
    Network(String),

    /// The reissue response was success-shaped but carried no usable token.
    #[error("Token reissue response carried no token")]
    MissingToken,

    /// The reissue response could not be interpreted.
    #[error("Token reissue protocol failure: {0}")]
    Protocol(String),

    /// The leader went away before settling the cycle.
    #[error("Refresh cycle aborted before completion")]
    Aborted,
}

/// Outcome delivered to waiters: the fresh token, or why there is none.
pub type RefreshOutcome = Result<String, RefreshError>;

type Waiter = oneshot::Sender<RefreshOutcome>;

#[derive(Default)]
struct CoordState {
    /// True iff exactly one reissue call is outstanding.
    refreshing: bool,
    /// Continuations enqueued while `refreshing` was observed true.
    waiters: Vec<Waiter>,
}

/// Role assigned to a caller joining a refresh cycle.
pub enum Ticket {
    /// This caller elected itself; it must perform the reissue and settle.
    Leader(LeaderGuard),
    /// A cycle is in flight; await the leader's outcome.
    Waiter(oneshot::Receiver<RefreshOutcome>),
}

/// Coalesces concurrent reissue attempts into a single in-flight call.
pub struct RefreshCoordinator {
    state: Arc<Mutex<CoordState>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordState::default())),
        }
    }

    /// Join the current cycle, or start one.
    ///
    /// The election and the enqueue both happen under the same lock
    /// acquisition, so for any set of concurrent joiners exactly one receives
    /// [`Ticket::Leader`].
    pub fn join(&self) -> Ticket {
        let mut state = self.state.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            Ticket::Waiter(rx)
        } else {
            state.refreshing = true;
            Ticket::Leader(LeaderGuard {
                state: Arc::clone(&self.state),
                settled: false,
            })
        }
    }

    /// Whether a cycle is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Obligation to settle the cycle this leader started.
///
/// Dropping the guard without calling [`settle`](Self::settle) resolves all
/// waiters with [`RefreshError::Aborted`] and resets the flag, so a cancelled
/// leader can never leave waiters suspended or the coordinator wedged.
pub struct LeaderGuard {
    state: Arc<Mutex<CoordState>>,
    settled: bool,
}

impl LeaderGuard {
    /// Fan `outcome` out to every waiter in enqueue order and end the cycle.
    pub fn settle(mut self, outcome: RefreshOutcome) {
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: RefreshOutcome) {
        // Take the queue and drop the flag atomically; waiters enqueued from
        // here on belong to the next cycle.
        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        for waiter in waiters {
            // A waiter that stopped listening is its own problem.
            let _ = waiter.send(outcome.clone());
        }
        self.settled = true;
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.finish(Err(RefreshError::Aborted));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_joiner_becomes_waiter() {
        let coordinator = RefreshCoordinator::new();

        let Ticket::Leader(guard) = coordinator.join() else {
            panic!("first joiner must lead");
        };
        assert!(coordinator.is_refreshing());

        let Ticket::Waiter(rx) = coordinator.join() else {
            panic!("second joiner must wait");
        };

        guard.settle(Ok("tok-2".to_string()));
        assert_eq!(rx.await.unwrap(), Ok("tok-2".to_string()));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_all_waiters_get_identical_outcome() {
        let coordinator = RefreshCoordinator::new();

        let Ticket::Leader(guard) = coordinator.join() else {
            panic!("first joiner must lead");
        };
        let receivers: Vec<_> = (0..4)
            .map(|_| match coordinator.join() {
                Ticket::Waiter(rx) => rx,
                Ticket::Leader(_) => panic!("only one leader per cycle"),
            })
            .collect();

        guard.settle(Err(RefreshError::Rejected {
            code: 4103,
            message: "session not found".to_string(),
        }));

        for rx in receivers {
            let outcome = rx.await.unwrap();
            assert_eq!(
                outcome,
                Err(RefreshError::Rejected {
                    code: 4103,
                    message: "session not found".to_string(),
                })
            );
        }
    }

    #[tokio::test]
    async fn test_dropped_leader_aborts_waiters() {
        let coordinator = RefreshCoordinator::new();

        let Ticket::Leader(guard) = coordinator.join() else {
            panic!("first joiner must lead");
        };
        let Ticket::Waiter(rx) = coordinator.join() else {
            panic!("second joiner must wait");
        };

        drop(guard);

        assert_eq!(rx.await.unwrap(), Err(RefreshError::Aborted));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn test_new_cycle_can_start_after_settle() {
        let coordinator = RefreshCoordinator::new();

        let Ticket::Leader(guard) = coordinator.join() else {
            panic!("first joiner must lead");
        };
        guard.settle(Ok("tok-2".to_string()));

        match coordinator.join() {
            Ticket::Leader(guard) => guard.settle(Ok("tok-3".to_string())),
            Ticket::Waiter(_) => panic!("settled cycle must not absorb new joiners"),
        }
    }
}
