//! Virtual-clock task scheduler
//!
//! Replaces ambient `setInterval`/`setTimeout` style callbacks with explicit
//! tasks owned by each engine. Time only moves when the owner calls
//! [`Timers::pop_due`] / [`Timers::settle`], which keeps runs reproducible.
//!
//! Firing order is chronological; tasks due at the same instant fire in
//! registration order.

use serde::{Deserialize, Serialize};

/// Handle to a scheduled task, used for cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Task<T> {
    id: u64,
    due_ms: u64,
    /// `Some` for repeating tasks
    period_ms: Option<u64>,
    payload: T,
}

/// Scheduler of one-shot and repeating tasks carrying a payload `T`
#[derive(Debug, Clone)]
pub struct Timers<T> {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_id: 1,
            tasks: Vec::new(),
        }
    }
}

impl<T: Clone> Timers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now_ms
    }

    /// Number of live tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Fire `payload` every `period_ms`, first at `now + period_ms`
    pub fn every(&mut self, period_ms: u64, payload: T) -> TimerHandle {
        let period_ms = period_ms.max(1);
        self.push(period_ms, Some(period_ms), payload)
    }

    /// Fire `payload` once at `now + delay_ms`
    pub fn after(&mut self, delay_ms: u64, payload: T) -> TimerHandle {
        self.push(delay_ms, None, payload)
    }

    fn push(&mut self, delay_ms: u64, period_ms: Option<u64>, payload: T) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            due_ms: self.now_ms.saturating_add(delay_ms),
            period_ms,
            payload,
        });
        TimerHandle(id)
    }

    /// Cancel a task. Returns false if it already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != handle.0);
        self.tasks.len() != before
    }

    pub fn is_live(&self, handle: TimerHandle) -> bool {
        self.tasks.iter().any(|t| t.id == handle.0)
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Pop the earliest task due at or before `until_ms`, moving the clock to
    /// its due time. Repeating tasks are rescheduled one period later, or
    /// dropped once the next firing would fall past the end of the clock.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<T> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let task = &mut self.tasks[idx];
        self.now_ms = self.now_ms.max(task.due_ms);
        match task.period_ms.and_then(|period| task.due_ms.checked_add(period)) {
            Some(next_due) => {
                task.due_ms = next_due;
                Some(task.payload.clone())
            }
            None => Some(self.tasks.remove(idx).payload),
        }
    }

    /// Move the clock forward to `until_ms` once everything due has been popped
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut Timers<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(p) = timers.pop_due(until) {
            fired.push((timers.now(), p));
        }
        timers.settle(until);
        fired
    }

    #[test]
    fn test_repeating_fires_per_interval() {
        let mut timers = Timers::new();
        timers.every(100, "tick");
        let fired = drain(&mut timers, 350);
        assert_eq!(fired, vec![(100, "tick"), (200, "tick"), (300, "tick")]);
        assert_eq!(timers.now(), 350);
        // next one at 400
        assert_eq!(drain(&mut timers, 399), vec![]);
        assert_eq!(drain(&mut timers, 400), vec![(400, "tick")]);
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = Timers::new();
        let h = timers.after(50, "once");
        assert!(timers.is_live(h));
        assert_eq!(drain(&mut timers, 1000), vec![(50, "once")]);
        assert!(!timers.is_live(h));
        assert!(!timers.cancel(h));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_chronological_then_registration_order() {
        let mut timers = Timers::new();
        timers.every(30, "fast");
        timers.after(60, "slow");
        let fired = drain(&mut timers, 60);
        assert_eq!(fired, vec![(30, "fast"), (60, "fast"), (60, "slow")]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = Timers::new();
        let a = timers.every(10, "a");
        let b = timers.every(10, "b");
        assert!(timers.cancel(a));
        assert!(!timers.cancel(a));
        assert_eq!(drain(&mut timers, 10), vec![(10, "b")]);
        timers.cancel(b);
        assert_eq!(drain(&mut timers, 1000), vec![]);
    }

    #[test]
    fn test_clock_saturates_at_end_of_time() {
        let mut timers = Timers::new();
        timers.settle(u64::MAX - 5);
        timers.every(4, "tick");
        let fired = drain(&mut timers, u64::MAX);
        assert_eq!(fired, vec![(u64::MAX - 1, "tick")]);
        assert!(timers.is_empty());

        timers.after(10, "late");
        assert_eq!(drain(&mut timers, u64::MAX), vec![(u64::MAX, "late")]);
    }

    #[test]
    fn test_zero_period_does_not_spin() {
        let mut timers = Timers::new();
        timers.every(0, "x");
        assert_eq!(drain(&mut timers, 3).len(), 3);
    }
}
