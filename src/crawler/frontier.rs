//! Frontier and visited set for the crawl
//!
//! This module owns the only state shared by crawl workers:
//! - The FIFO queue of URLs waiting to be fetched
//! - The visited set guarding against re-enqueueing a URL
//! - The count of workers currently mid-task
//! - The worker slot counter and the run phase
//!
//! All of it lives behind one mutex, so test-and-set on the visited set,
//! popping a URL, and the termination check are each a single atomic step.

use crate::state::CrawlPhase;
use crate::url::CrawlTarget;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;

/// Identifier namespacing the output of one dispatched task
///
/// Slots increase monotonically in dispatch order and are never reused,
/// even when the task they were issued to fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerSlot(pub u64);

impl WorkerSlot {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WorkerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct FrontierState {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<CrawlTarget>,
    in_flight: usize,
    next_slot: u64,
    phase: CrawlPhase,
}

impl FrontierState {
    /// Inserts into the visited set and queues only if the target was new
    fn enqueue(&mut self, target: CrawlTarget) -> bool {
        if self.visited.contains(&target) {
            return false;
        }
        self.visited.insert(target.clone());
        self.queue.push_back(target);
        true
    }

    fn set_phase(&mut self, next: CrawlPhase) {
        if self.phase == next {
            return;
        }
        if !self.phase.can_transition_to(next) {
            tracing::error!("Ignoring invalid phase transition {} -> {}", self.phase, next);
            return;
        }
        tracing::debug!(
            "Crawl phase {} -> {} (queued: {}, in flight: {}, visited: {})",
            self.phase,
            next,
            self.queue.len(),
            self.in_flight,
            self.visited.len()
        );
        self.phase = next;
    }

    /// Recomputes the phase from queue and in-flight counts
    fn settle_phase(&mut self) {
        let next = match (self.queue.is_empty(), self.in_flight) {
            (true, 0) => CrawlPhase::Terminated,
            (true, _) => CrawlPhase::Draining,
            (false, _) => CrawlPhase::Running,
        };
        self.set_phase(next);
    }
}

/// Point-in-time view of the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontierSnapshot {
    pub phase: CrawlPhase,
    pub queued: usize,
    pub in_flight: usize,
    pub visited: usize,
}

/// The shared crawl frontier
#[derive(Debug)]
pub struct Frontier {
    state: Mutex<FrontierState>,
    notify: Notify,
}

impl Frontier {
    /// Creates a frontier holding only the seed, marked visited
    pub fn seeded(seed: CrawlTarget) -> Self {
        let mut state = FrontierState {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            in_flight: 0,
            next_slot: 0,
            phase: CrawlPhase::Seeded,
        };
        state.enqueue(seed);

        Self {
            state: Mutex::new(state),
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        // Every critical section leaves the state consistent before it can panic
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queues a target unless it was ever enqueued before
    ///
    /// Returns true if the target was new. Once the run has terminated no
    /// more targets are accepted.
    pub fn enqueue(&self, target: CrawlTarget) -> bool {
        let added = {
            let mut state = self.lock();
            if state.phase.is_terminal() {
                return false;
            }
            let added = state.enqueue(target);
            if added && state.phase == CrawlPhase::Draining {
                state.settle_phase();
            }
            added
        };

        if added {
            self.notify.notify_waiters();
        }
        added
    }

    /// Waits for the next target to process
    ///
    /// Returns `None` once the frontier is empty and no worker is mid-task;
    /// at that point the run is terminated and every waiting worker is woken
    /// so it can exit too.
    pub async fn next(self: &Arc<Self>) -> Option<Dispatch> {
        loop {
            let notified = {
                let mut state = self.lock();

                if let Some(target) = state.queue.pop_front() {
                    let slot = WorkerSlot(state.next_slot);
                    state.next_slot += 1;
                    state.in_flight += 1;
                    state.set_phase(CrawlPhase::Running);
                    state.settle_phase();

                    return Some(Dispatch {
                        frontier: Arc::clone(self),
                        slot,
                        target,
                        finished: false,
                    });
                }

                if state.in_flight == 0 {
                    state.set_phase(CrawlPhase::Terminated);
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }

                // Registered while the lock is held, so a completion between
                // unlocking and awaiting still wakes this worker
                self.notify.notified()
            };

            notified.await;
        }
    }

    /// Marks one dispatched task as done and enqueues what it discovered
    ///
    /// Both happen under the same lock as the termination check, so the run
    /// cannot be declared finished while a completing worker still has URLs
    /// to add.
    fn complete(&self, discovered: Vec<CrawlTarget>) -> usize {
        let added = {
            let mut state = self.lock();
            let mut added = 0;
            for target in discovered {
                if state.enqueue(target) {
                    added += 1;
                }
            }
            state.in_flight = state.in_flight.saturating_sub(1);
            state.settle_phase();
            added
        };

        self.notify.notify_waiters();
        added
    }

    pub fn snapshot(&self) -> FrontierSnapshot {
        let state = self.lock();
        FrontierSnapshot {
            phase: state.phase,
            queued: state.queue.len(),
            in_flight: state.in_flight,
            visited: state.visited.len(),
        }
    }
}

/// A target handed to one worker
///
/// Holding a `Dispatch` counts as one in-flight task. Call [`Dispatch::finish`]
/// with the discovered links when done; dropping it unfinished (for instance
/// while unwinding from a panic) still releases the in-flight count.
#[derive(Debug)]
pub struct Dispatch {
    frontier: Arc<Frontier>,
    slot: WorkerSlot,
    target: CrawlTarget,
    finished: bool,
}

impl Dispatch {
    pub fn slot(&self) -> WorkerSlot {
        self.slot
    }

    pub fn target(&self) -> &CrawlTarget {
        &self.target
    }

    /// Completes the task, returning how many discovered targets were new
    pub fn finish(mut self, discovered: Vec<CrawlTarget>) -> usize {
        self.finished = true;
        self.frontier.complete(discovered)
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        if !self.finished {
            self.frontier.complete(Vec::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn target(path: &str) -> CrawlTarget {
        CrawlTarget::parse(&format!("https://example.com{}", path)).unwrap()
    }

    fn seeded() -> Arc<Frontier> {
        Arc::new(Frontier::seeded(target("/")))
    }

    #[test]
    fn test_seeded_state() {
        let frontier = seeded();
        let snapshot = frontier.snapshot();
        assert_eq!(snapshot.phase, CrawlPhase::Seeded);
        assert_eq!(snapshot.queued, 1);
        assert_eq!(snapshot.visited, 1);
        assert!(!frontier.enqueue(target("/")));
    }

    #[test]
    fn test_enqueue_is_test_and_set() {
        let frontier = seeded();
        assert!(frontier.enqueue(target("/a")));
        assert!(!frontier.enqueue(target("/a")));
        assert!(!frontier.enqueue(target("/")));
        assert_eq!(frontier.snapshot().queued, 2);
    }

    #[test]
    fn test_fragment_variants_share_entry() {
        let frontier = seeded();
        assert!(frontier.enqueue(target("/x#section1")));
        assert!(!frontier.enqueue(target("/x")));
        assert_eq!(frontier.snapshot().visited, 2);
    }

    #[tokio::test]
    async fn test_fifo_and_slots() {
        let frontier = seeded();
        frontier.enqueue(target("/a"));
        frontier.enqueue(target("/b"));

        let first = frontier.next().await.unwrap();
        let second = frontier.next().await.unwrap();
        let third = frontier.next().await.unwrap();

        assert_eq!(first.target(), &target("/"));
        assert_eq!(second.target(), &target("/a"));
        assert_eq!(third.target(), &target("/b"));
        assert_eq!(
            [first.slot(), second.slot(), third.slot()],
            [WorkerSlot(0), WorkerSlot(1), WorkerSlot(2)]
        );
        assert_eq!(frontier.snapshot().in_flight, 3);
    }

    #[tokio::test]
    async fn test_phase_progression() {
        let frontier = seeded();

        let dispatch = frontier.next().await.unwrap();
        assert_eq!(frontier.snapshot().phase, CrawlPhase::Draining);

        assert_eq!(dispatch.finish(vec![target("/a"), target("/")]), 1);
        assert_eq!(frontier.snapshot().phase, CrawlPhase::Running);

        let dispatch = frontier.next().await.unwrap();
        dispatch.finish(Vec::new());
        assert_eq!(frontier.snapshot().phase, CrawlPhase::Terminated);

        assert!(frontier.next().await.is_none());
        assert!(!frontier.enqueue(target("/late")));
    }

    #[tokio::test]
    async fn test_dropped_dispatch_releases_slot() {
        let frontier = seeded();
        let dispatch = frontier.next().await.unwrap();
        drop(dispatch);

        let snapshot = frontier.snapshot();
        assert_eq!(snapshot.in_flight, 0);
        assert_eq!(snapshot.phase, CrawlPhase::Terminated);
        assert!(frontier.next().await.is_none());
    }

    #[tokio::test]
    async fn test_idle_worker_woken_by_completion() {
        let frontier = seeded();
        let dispatch = frontier.next().await.unwrap();

        let waiter = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move {
                frontier
                    .next()
                    .await
                    .map(|d| d.target().clone())
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatch.finish(vec![target("/found")]);

        let received = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("waiter was never woken")
            .unwrap();
        assert_eq!(received, Some(target("/found")));
    }

    #[tokio::test]
    async fn test_idle_workers_released_on_termination() {
        let frontier = seeded();
        let dispatch = frontier.next().await.unwrap();

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move { frontier.next().await.is_none() })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        dispatch.finish(Vec::new());

        for waiter in waiters {
            let exited = tokio::time::timeout(Duration::from_secs(2), waiter)
                .await
                .expect("waiter hung after termination")
                .unwrap();
            assert!(exited);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_enqueue_single_winner() {
        let frontier = seeded();
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let frontier = Arc::clone(&frontier);
                tokio::spawn(async move {
                    (0..50)
                        .filter(|i| frontier.enqueue(target(&format!("/p{}", i))))
                        .count()
                })
            })
            .collect();

        let mut total = 0;
        for handle in handles {
            total += handle.await.unwrap();
        }

        assert_eq!(total, 50);
        assert_eq!(frontier.snapshot().visited, 51);
    }
}
