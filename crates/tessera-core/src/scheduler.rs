#![forbid(unsafe_code)]

//! Deterministic timer queue on a virtual clock.
//!
//! A [`Scheduler`] never reads wall-clock time. The host advances it with
//! frame deltas (from a [`FrameClock`] in production, fixed steps in
//! tests) and handles each [`Fired`] timer in due order.
//!
//! # Invariants
//!
//! 1. Timers fire in `(due, id)` order; ties fire in scheduling order.
//! 2. The clock never moves backwards.
//! 3. A cancelled timer never fires, including repeats already due in the
//!    same advance when the host cancels between [`Scheduler::poll`] calls.
//! 4. Repeating intervals are at least 1ms so a single advance terminates.

use std::time::Duration;

use web_time::Instant;

/// Handle for a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A timer that came due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub payload: T,
    /// Virtual time the timer was due at.
    pub at: Duration,
}

#[derive(Debug, Clone)]
struct Timer<T> {
    id: TimerId,
    due: Duration,
    interval: Option<Duration>,
    payload: T,
}

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Virtual-time timer queue.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: Duration,
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            timers: Vec::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Create an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fire `payload` once after `delay`.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> TimerId {
        self.insert(delay, None, payload)
    }

    /// Fire `payload` every `interval`, first after one interval.
    pub fn schedule_repeating(&mut self, interval: Duration, payload: T) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(interval, Some(interval), payload)
    }

    fn insert(&mut self, delay: Duration, interval: Option<Duration>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            due: self.now.saturating_add(delay),
            interval,
            payload,
        });
        id
    }

    /// Cancel a timer. Returns `false` if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Whether the timer is still scheduled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Number of scheduled timers.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Pop the next timer due at or before `until`, moving the clock to its
    /// due time. Returns `None` once nothing else is due.
    ///
    /// Call [`Scheduler::settle`] with the same `until` afterwards.
    pub fn poll(&mut self, until: Duration) -> Option<Fired<T>> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.id))
            .map(|(i, _)| i)?;

        let due = self.timers[index].due;
        self.now = self.now.max(due);
        let fired = match self.timers[index].interval {
            Some(interval) => {
                let timer = &mut self.timers[index];
                timer.due = due.saturating_add(interval);
                Fired {
                    id: timer.id,
                    payload: timer.payload.clone(),
                    at: due,
                }
            }
            None => {
                let timer = self.timers.swap_remove(index);
                Fired {
                    id: timer.id,
                    payload: timer.payload,
                    at: due,
                }
            }
        };
        Some(fired)
    }

    /// Move the clock forward to `until` without firing anything.
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Advance by `dt` and return every timer that came due, in order.
    ///
    /// Hosts that cancel timers while handling them should use
    /// [`Scheduler::poll`] instead.
    pub fn advance(&mut self, dt: Duration) -> Vec<Fired<T>> {
        let until = self.now.saturating_add(dt);
        let mut fired = Vec::new();
        while let Some(f) = self.poll(until) {
            fired.push(f);
        }
        self.settle(until);
        fired
    }
}

/// Wall-clock frame delta source for hosts.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    /// Start measuring from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time since the previous call (or construction).
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn one_shot_fires_once_at_due_time() {
        let mut sched = Scheduler::new();
        let id = sched.schedule(ms(100), "a");
        assert!(sched.advance(ms(99)).is_empty());
        let fired = sched.advance(ms(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, id);
        assert_eq!(fired[0].at, ms(100));
        assert!(!sched.is_pending(id));
        assert!(sched.advance(ms(500)).is_empty());
    }

    #[test]
    fn repeating_fires_each_interval() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(ms(50), 1u8);
        let fired = sched.advance(ms(175));
        let times: Vec<_> = fired.iter().map(|f| f.at).collect();
        assert_eq!(times, vec![ms(50), ms(100), ms(150)]);
        assert_eq!(sched.now(), ms(175));
    }

    #[test]
    fn ties_fire_in_schedule_order() {
        let mut sched = Scheduler::new();
        sched.schedule(ms(10), "first");
        sched.schedule(ms(10), "second");
        let fired: Vec<_> = sched.advance(ms(10)).into_iter().map(|f| f.payload).collect();
        assert_eq!(fired, vec!["first", "second"]);
    }

    #[test]
    fn cancel_between_polls_stops_repeats() {
        let mut sched = Scheduler::new();
        let id = sched.schedule_repeating(ms(10), ());
        let until = ms(100);
        let first = sched.poll(until);
        assert!(first.is_some());
        assert!(sched.cancel(id));
        assert!(sched.poll(until).is_none());
        sched.settle(until);
        assert_eq!(sched.now(), until);
        assert!(!sched.cancel(id));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(Duration::ZERO, ());
        assert_eq!(sched.advance(ms(3)).len(), 3);
    }

    #[test]
    fn clock_never_goes_backwards() {
        let mut sched: Scheduler<()> = Scheduler::new();
        sched.settle(ms(20));
        sched.settle(ms(10));
        assert_eq!(sched.now(), ms(20));
    }

    #[test]
    fn frame_clock_is_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(a >= Duration::ZERO);
        assert!(b >= Duration::ZERO);
    }
}
