//! Delayed one-shot callbacks.
//!
//! The chat widget never sleeps itself; it hands the reply to a [`Scheduler`].
//! The server injects a [`TokioScheduler`], tests inject a [`ManualScheduler`]
//! and move its virtual clock forward explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs a task once after a delay.
///
/// Fire-and-forget: there is no cancellation and no ordering guarantee
/// between tasks other than what an implementation documents.
pub trait Scheduler: Send + Sync + fmt::Debug {
    /// Run `task` after `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Scheduler backed by tokio timers.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Schedule onto the given runtime.
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Schedule onto the runtime this is called from.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }
}

/// Deterministic scheduler driven by a virtual clock.
///
/// Tasks run only when the clock is advanced. Due tasks run in order of due
/// time, ties broken by scheduling order.
#[derive(Default)]
pub struct ManualScheduler {
    inner: Mutex<ManualInner>,
}

#[derive(Default)]
struct ManualInner {
    now: Duration,
    seq: u64,
    pending: BTreeMap<(Duration, u64), Task>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ManualScheduler")
            .field("now", &inner.now)
            .field("pending", &inner.pending.len())
            .finish()
    }
}

impl ManualScheduler {
    /// Create a scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move the clock forward by `by` and run every task that becomes due.
    ///
    /// Tasks scheduled by a running task are picked up if they fall inside
    /// the same window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now + by;
        let mut ran = 0;
        while let Some(task) = self.pop_due(target) {
            task();
            ran += 1;
        }
        self.lock().now = target;
        ran
    }

    /// Run pending tasks until none remain, advancing the clock as needed.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            let next_due = {
                let inner = self.lock();
                match inner.pending.keys().next() {
                    Some(&(due, _)) => due.saturating_sub(inner.now),
                    None => return ran,
                }
            };
            ran += self.advance(next_due);
        }
    }

    fn pop_due(&self, target: Duration) -> Option<Task> {
        let mut inner = self.lock();
        let (&(due, _), _) = inner.pending.first_key_value()?;
        if due > target {
            return None;
        }
        inner.now = due;
        inner.pending.pop_first().map(|(_, task)| task)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut inner = self.lock();
        let key = (inner.now + delay, inner.seq);
        inner.seq += 1;
        inner.pending.insert(key, task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Task) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let make = move |label: &'static str| -> Task {
            let sink = Arc::clone(&sink);
            Box::new(move || sink.lock().unwrap().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_manual_runs_only_due_tasks() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_millis(800), task("reply"));
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.advance(Duration::from_millis(799)), 0);
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.lock().unwrap(), vec!["reply"]);
        assert_eq!(scheduler.now(), Duration::from_millis(800));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_manual_orders_by_due_time_then_sequence() {
        let scheduler = ManualScheduler::new();
        let (log, task) = recorder();

        scheduler.schedule(Duration::from_millis(500), task("late"));
        scheduler.schedule(Duration::from_millis(100), task("early"));
        scheduler.schedule(Duration::from_millis(500), task("late-second"));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(*log.lock().unwrap(), vec!["early", "late", "late-second"]);
    }

    #[test]
    fn test_manual_run_until_idle_follows_chained_tasks() {
        let scheduler = Arc::new(ManualScheduler::new());
        let (log, task) = recorder();

        let inner = Arc::clone(&scheduler);
        let follow_up = task("second");
        let first = task("first");
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                first();
                inner.schedule(Duration::from_millis(10), follow_up);
            }),
        );

        assert_eq!(scheduler.run_until_idle(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(scheduler.now(), Duration::from_millis(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let scheduler = TokioScheduler::try_current().expect("inside runtime");
        let (tx, rx) = tokio::sync::oneshot::channel();

        scheduler.schedule(
            Duration::from_millis(800),
            Box::new(move || {
                let _ = tx.send(());
            }),
        );

        tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("task fired before timeout")
            .expect("sender kept alive");
    }
}
