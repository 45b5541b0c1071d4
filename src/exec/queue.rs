//! Bounded FIFO execution queue.
//!
//! Gates how many external-process invocations run at once. Calls submitted
//! past the limit wait in an unbounded FIFO backlog; every completion drains
//! the backlog back up to the limit. The limit is read fresh on each
//! dispatch/drain decision, so it can be changed at any time: lowering it
//! never preempts calls already in flight, only throttles future dispatch.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tracing::debug;
use crate::utils::{OptimizerError, OptimizerResult};

type Job = BoxFuture<'static, ()>;

/// A call deferred because the concurrency limit was reached.
struct PendingCall {
    job: Job,
}

struct QueueState {
    limit: usize,
    in_flight: usize,
    backlog: VecDeque<PendingCall>,
}

/// Explicit scheduler object bounding concurrent invocations.
///
/// Cheap to clone; clones share the same counter and backlog.
#[derive(Clone)]
pub struct ExecQueue {
    state: Arc<Mutex<QueueState>>,
}

impl ExecQueue {
    pub fn new(limit: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                limit,
                in_flight: 0,
                backlog: VecDeque::new(),
            })),
        }
    }

    /// Submits a call; runs it now if a slot is free, otherwise queues it.
    ///
    /// The returned future resolves with the call's own output once the call
    /// has been dispatched and has completed. There is no timeout and no
    /// cancellation: a queued call waits as long as it takes.
    pub async fn submit<F, Fut, T>(&self, call: F) -> OptimizerResult<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let job: Job = async move {
            let _ = tx.send(call().await);
        }
        .boxed();

        let dispatch_now = {
            let mut state = self.state.lock().unwrap();
            if state.in_flight < state.limit {
                state.in_flight += 1;
                Some(job)
            } else {
                debug!("Concurrency limit reached, queueing call (backlog: {})", state.backlog.len() + 1);
                state.backlog.push_back(PendingCall { job });
                None
            }
        };
        if let Some(job) = dispatch_now {
            self.spawn_job(job);
        }

        rx.await
            .map_err(|_| OptimizerError::queue("call dropped before completion"))
    }

    /// Changes the concurrency limit.
    ///
    /// Takes effect on the next dispatch decision; raising the limit drains
    /// the backlog immediately rather than waiting for a completion.
    pub fn set_limit(&self, limit: usize) {
        let ready = {
            let mut state = self.state.lock().unwrap();
            state.limit = limit;
            Self::drain_locked(&mut state)
        };
        for job in ready {
            self.spawn_job(job);
        }
    }

    pub fn limit(&self) -> usize {
        self.state.lock().unwrap().limit
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().unwrap().in_flight
    }

    pub fn backlog_len(&self) -> usize {
        self.state.lock().unwrap().backlog.len()
    }

    fn spawn_job(&self, job: Job) {
        let queue = self.clone();
        tokio::spawn(async move {
            job.await;
            queue.complete();
        });
    }

    /// Completion hook: frees the slot and dispatches queued calls.
    fn complete(&self) {
        let ready = {
            let mut state = self.state.lock().unwrap();
            state.in_flight = state.in_flight.saturating_sub(1);
            Self::drain_locked(&mut state)
        };
        for job in ready {
            self.spawn_job(job);
        }
    }

    /// Pops backlogged calls while slots are free, reserving a slot for each.
    /// Jobs are returned (and later spawned) in arrival order.
    fn drain_locked(state: &mut QueueState) -> Vec<Job> {
        let mut ready = Vec::new();
        while state.in_flight < state.limit {
            match state.backlog.pop_front() {
                Some(pending) => {
                    state.in_flight += 1;
                    ready.push(pending.job);
                }
                None => break,
            }
        }
        ready
    }
}
