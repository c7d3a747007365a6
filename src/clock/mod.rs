//! Wall clock and cancellable delayed tasks.
//!
//! Simulated latency (page loading spinners, sign-in delay) goes through a
//! [`Clock`] so tests can swap the tokio timer for a manual clock.

use std::future::Future;
use std::pin::Pin;
#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::AbortHandle;

/// Deferred callback run by a clock.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Future returned by [`Clock::sleep`].
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Run `task` once `after` has elapsed unless the handle is cancelled first.
    fn delay(&self, after: Duration, task: Task) -> DelayedTask;

    fn sleep(&self, after: Duration) -> Sleep;
}

type Slot = Arc<Mutex<Option<Task>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to a scheduled task.
///
/// Dropping the handle does not cancel the task.
#[derive(Clone)]
pub struct DelayedTask {
    slot: Slot,
    abort: Option<AbortHandle>,
}

impl DelayedTask {
    fn new(task: Task) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(task))),
            abort: None,
        }
    }

    /// Cancel the task. Once this returns the task will not start.
    pub fn cancel(&self) {
        lock(&self.slot).take();
        if let Some(abort) = &self.abort {
            abort.abort();
        }
    }

    /// `true` once the task has either run or been cancelled.
    pub fn is_finished(&self) -> bool {
        lock(&self.slot).is_none()
    }

    fn fire(slot: &Slot) {
        // Take under the lock, run outside it so the task may schedule or cancel.
        let task = lock(slot).take();
        if let Some(task) = task {
            task();
        }
    }
}

impl std::fmt::Debug for DelayedTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedTask")
            .field("finished", &self.is_finished())
            .finish()
    }
}

/// Real time, backed by the tokio timer. Must be used inside a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn delay(&self, after: Duration, task: Task) -> DelayedTask {
        let mut handle = DelayedTask::new(task);
        let slot = handle.slot.clone();
        let join = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            DelayedTask::fire(&slot);
        });
        handle.abort = Some(join.abort_handle());
        handle
    }

    fn sleep(&self, after: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(after))
    }
}

#[cfg(test)]
struct Pending {
    due: DateTime<Utc>,
    seq: u64,
    slot: Slot,
}

/// Clock that only moves when told to. `sleep` resolves immediately.
#[cfg(test)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    pending: Mutex<Vec<Pending>>,
    seq: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
            pending: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
        }
    }

    /// Move time forward and run every task that came due, earliest first.
    pub fn advance(&self, by: Duration) {
        let now = {
            let mut now = lock(&self.now);
            *now += to_chrono(by);
            *now
        };

        let mut due: Vec<Pending> = {
            let mut pending = lock(&self.pending);
            let (ready, waiting): (Vec<Pending>, Vec<Pending>) =
                pending.drain(..).partition(|p| p.due <= now);
            *pending = waiting;
            ready
        };
        due.sort_by_key(|p| (p.due, p.seq));

        for pending in due {
            DelayedTask::fire(&pending.slot);
        }
    }

    /// Number of scheduled tasks that have neither run nor been cancelled.
    pub fn pending_tasks(&self) -> usize {
        lock(&self.pending)
            .iter()
            .filter(|p| lock(&p.slot).is_some())
            .count()
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }

    fn delay(&self, after: Duration, task: Task) -> DelayedTask {
        let handle = DelayedTask::new(task);
        let due = self.now() + to_chrono(after);
        lock(&self.pending).push(Pending {
            due,
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            slot: handle.slot.clone(),
        });
        handle
    }

    fn sleep(&self, _after: Duration) -> Sleep {
        Box::pin(std::future::ready(()))
    }
}

#[cfg(test)]
fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(i64::try_from(duration.as_millis()).unwrap_or(i64::MAX / 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::atomic::AtomicUsize;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn counter_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = counter.clone();
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_clock_runs_due_tasks() {
        let clock = ManualClock::new(start());
        let counter = Arc::new(AtomicUsize::new(0));
        let task = clock.delay(Duration::from_millis(800), counter_task(&counter));

        clock.advance(Duration::from_millis(799));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!task.is_finished());

        clock.advance(Duration::from_millis(1));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(task.is_finished());

        clock.advance(Duration::from_secs(10));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_clock_cancel() {
        let clock = ManualClock::new(start());
        let counter = Arc::new(AtomicUsize::new(0));
        let task = clock.delay(Duration::from_millis(100), counter_task(&counter));
        assert_eq!(clock.pending_tasks(), 1);

        task.cancel();
        assert_eq!(clock.pending_tasks(), 0);
        clock.advance(Duration::from_secs(1));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_manual_clock_order_and_now() {
        let clock = Arc::new(ManualClock::new(start()));
        let order = Arc::new(Mutex::new(Vec::new()));
        for (label, ms) in [("late", 300u64), ("early", 100), ("mid", 200)] {
            let order = order.clone();
            clock.delay(
                Duration::from_millis(ms),
                Box::new(move || lock(&order).push(label)),
            );
        }
        clock.advance(Duration::from_millis(500));
        assert_eq!(*lock(&order), vec!["early", "mid", "late"]);
        assert_eq!(clock.now(), start() + chrono::Duration::milliseconds(500));
    }

    #[tokio::test]
    async fn test_manual_sleep_is_immediate() {
        let clock = ManualClock::new(start());
        clock.sleep(Duration::from_secs(3600)).await;
        assert_eq!(clock.now(), start());
    }

    #[tokio::test]
    async fn test_tokio_clock_delay_and_cancel() {
        let clock = TokioClock;
        let fired = Arc::new(AtomicUsize::new(0));
        let kept = clock.delay(Duration::from_millis(50), counter_task(&fired));
        let cancelled = clock.delay(Duration::from_millis(50), counter_task(&fired));
        cancelled.cancel();

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(kept.is_finished());
    }
}
