#![forbid(unsafe_code)]

//! Cancellable repeating timers.
//!
//! A [`Ticker`] starts timers; each start returns a [`TimerHandle`] that
//! cancels the timer when stopped or dropped. Every tick carries the
//! [`TimerId`] of the timer that produced it, so an owner holding a single
//! handle can discard ticks from timers it already tore down.
//!
//! Two tickers are provided:
//!
//! - [`ThreadTicker`]: one background thread per timer, woken by a stop
//!   signal, sending ids over an `mpsc` channel.
//! - [`VirtualTicker`]: a deterministic virtual clock driven explicitly by the
//!   caller. Used by tests and headless replay.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::sync::{Arc, Condvar, Mutex, mpsc};
use std::thread;
use std::time::Duration;

/// Identifies one started timer. Never reused by the same ticker.
pub type TimerId = u64;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A running timer. Dropping the handle cancels the timer.
pub trait TimerHandle {
    fn id(&self) -> TimerId;

    fn interval(&self) -> Duration;

    /// Cancel the timer and wait for it to wind down.
    fn stop(self)
    where
        Self: Sized;
}

/// Starts repeating timers.
pub trait Ticker {
    type Handle: TimerHandle;

    /// Start a timer that fires every `interval` until stopped.
    fn start(&mut self, interval: Duration) -> Self::Handle;
}

// --- Thread-backed timers ---

/// Signal observed by a timer thread.
#[derive(Clone)]
struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if timed out.
    fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        if *stopped {
            return true;
        }
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(|e| e.into_inner());
        *stopped
    }
}

struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(|e| e.into_inner());
        *stopped = true;
        cvar.notify_all();
    }
}

/// Starts one background thread per timer.
pub struct ThreadTicker {
    sender: mpsc::Sender<TimerId>,
    next_id: TimerId,
}

impl ThreadTicker {
    pub fn new(sender: mpsc::Sender<TimerId>) -> Self {
        Self { sender, next_id: 1 }
    }

    /// A ticker plus the receiver its timers deliver to.
    pub fn channel() -> (Self, mpsc::Receiver<TimerId>) {
        let (sender, receiver) = mpsc::channel();
        (Self::new(sender), receiver)
    }
}

fn saturating_millis(interval: Duration) -> u64 {
    u64::try_from(interval.as_millis()).unwrap_or(u64::MAX)
}

impl Ticker for ThreadTicker {
    type Handle = ThreadTimer;

    fn start(&mut self, interval: Duration) -> ThreadTimer {
        let id = self.next_id;
        self.next_id += 1;
        let interval = interval.max(MIN_INTERVAL);
        let (signal, trigger) = StopSignal::new();
        let sender = self.sender.clone();

        tracing::debug!(timer_id = id, interval_ms = saturating_millis(interval), "starting timer");
        let thread = thread::spawn(move || {
            while !signal.wait_timeout(interval) {
                if sender.send(id).is_err() {
                    break;
                }
            }
        });

        ThreadTimer {
            id,
            interval,
            trigger,
            thread: Some(thread),
        }
    }
}

/// Handle to a timer thread.
pub struct ThreadTimer {
    id: TimerId,
    interval: Duration,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl TimerHandle for ThreadTimer {
    fn id(&self) -> TimerId {
        self.id
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn stop(mut self) {
        tracing::debug!(timer_id = self.id, "stopping timer");
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ThreadTimer {
    fn drop(&mut self) {
        self.trigger.stop();
        // Don't join in drop to avoid blocking
    }
}

// --- Virtual timers ---

#[derive(Debug, Clone, Copy)]
struct VirtualEntry {
    interval: Duration,
    next_due: Duration,
}

#[derive(Debug, Default)]
struct ClockState {
    now: Duration,
    next_id: TimerId,
    timers: BTreeMap<TimerId, VirtualEntry>,
}

/// Shared virtual time source. Clones observe the same clock.
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    state: Rc<RefCell<ClockState>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of timers started and not yet cancelled.
    pub fn active_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Fire the earliest timer due at or before `deadline`.
    ///
    /// Moves the clock to the tick's due time and schedules the timer's next
    /// tick. Ties fire in start order.
    pub fn pop_due(&self, deadline: Duration) -> Option<TimerId> {
        let mut state = self.state.borrow_mut();
        let (id, due) = state
            .timers
            .iter()
            .filter(|(_, entry)| entry.next_due <= deadline)
            .min_by_key(|(id, entry)| (entry.next_due, **id))
            .map(|(id, entry)| (*id, entry.next_due))?;
        state.now = state.now.max(due);
        if let Some(entry) = state.timers.get_mut(&id) {
            entry.next_due += entry.interval;
        }
        Some(id)
    }

    /// Move the clock forward to `now` without firing anything.
    pub fn set_now(&self, now: Duration) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.max(now);
    }

    fn register(&self, interval: Duration) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = state.next_id;
        let next_due = state.now + interval;
        state.timers.insert(id, VirtualEntry { interval, next_due });
        id
    }

    fn cancel(&self, id: TimerId) {
        self.state.borrow_mut().timers.remove(&id);
    }
}

/// Ticker backed by a [`VirtualClock`].
#[derive(Debug, Clone, Default)]
pub struct VirtualTicker {
    clock: VirtualClock,
}

impl VirtualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: VirtualClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }
}

impl Ticker for VirtualTicker {
    type Handle = VirtualTimer;

    fn start(&mut self, interval: Duration) -> VirtualTimer {
        let interval = interval.max(MIN_INTERVAL);
        let id = self.clock.register(interval);
        VirtualTimer {
            id,
            interval,
            clock: self.clock.clone(),
        }
    }
}

#[derive(Debug)]
pub struct VirtualTimer {
    id: TimerId,
    interval: Duration,
    clock: VirtualClock,
}

impl TimerHandle for VirtualTimer {
    fn id(&self) -> TimerId {
        self.id
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn stop(self) {}
}

impl Drop for VirtualTimer {
    fn drop(&mut self) {
        self.clock.cancel(self.id);
    }
}
