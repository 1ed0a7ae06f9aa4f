//! Turn timer - one dedicated thread, one scheduling slot
//!
//! A schedule replaces whatever was pending and bumps the generation, so a
//! fire that raced a reschedule can be recognised as stale by the receiver
//! (see [`TurnTimer::is_current`]).

use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// What the timer fired for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerFire {
    /// Low-time warning, stage 0 is the earliest
    Warning(usize),
    /// The turn ran out
    Expired,
}

#[derive(Debug)]
struct Plan {
    started: Instant,
    delay: Duration,
    warnings: Vec<Duration>,
    next_warning: usize,
}

impl Plan {
    fn next_due(&self) -> (Instant, TimerFire) {
        match self.warnings.get(self.next_warning) {
            Some(&offset) if offset < self.delay => (
                self.started + offset,
                TimerFire::Warning(self.next_warning),
            ),
            _ => (self.started + self.delay, TimerFire::Expired),
        }
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    plan: Option<Plan>,
    shutdown: bool,
}

#[derive(Debug, Default)]
struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Shared {
    fn slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Single-slot timer running on its own thread
#[derive(Debug, Default)]
pub struct TurnTimer {
    shared: Arc<Shared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TurnTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn the timer thread; `on_fire` runs on it with the generation of the
    /// schedule that fired
    ///
    /// Calling `start` on a running timer does nothing.
    pub fn start<F>(&self, on_fire: F) -> io::Result<()>
    where
        F: Fn(u64, TimerFire) + Send + 'static,
    {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if handle.is_some() {
            return Ok(());
        }
        let shared = Arc::clone(&self.shared);
        *handle = Some(
            thread::Builder::new()
                .name("tetrecs-timer".into())
                .spawn(move || run(&shared, on_fire))?,
        );
        Ok(())
    }

    /// Replace the pending plan: warnings at each offset, then expiry after
    /// `delay`. Returns the new generation.
    pub fn schedule(&self, delay: Duration, warnings: &[Duration]) -> u64 {
        let mut slot = self.shared.slot();
        slot.generation += 1;
        slot.plan = Some(Plan {
            started: Instant::now(),
            delay,
            warnings: warnings.to_vec(),
            next_warning: 0,
        });
        self.shared.wake.notify_all();
        slot.generation
    }

    /// Drop the pending plan
    pub fn cancel(&self) {
        let mut slot = self.shared.slot();
        slot.generation += 1;
        slot.plan = None;
        self.shared.wake.notify_all();
    }

    /// Whether `generation` is still the latest schedule
    pub fn is_current(&self, generation: u64) -> bool {
        self.shared.slot().generation == generation
    }

    pub fn is_pending(&self) -> bool {
        self.shared.slot().plan.is_some()
    }

    /// Stop the thread and wait for it
    ///
    /// Safe to call from the timer thread itself (it is then detached rather
    /// than joined) and more than once.
    pub fn shutdown(&self) {
        {
            let mut slot = self.shared.slot();
            slot.shutdown = true;
            slot.plan = None;
            self.shared.wake.notify_all();
        }
        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl Drop for TurnTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<F>(shared: &Shared, on_fire: F)
where
    F: Fn(u64, TimerFire),
{
    let mut slot = shared.slot();
    loop {
        if slot.shutdown {
            return;
        }
        let Some(plan) = slot.plan.as_mut() else {
            slot = shared
                .wake
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let (due, fire) = plan.next_due();
        let now = Instant::now();
        if now < due {
            slot = shared
                .wake
                .wait_timeout(slot, due - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
            continue;
        }

        match fire {
            TimerFire::Warning(_) => plan.next_warning += 1,
            TimerFire::Expired => slot.plan = None,
        }
        let generation = slot.generation;
        drop(slot);
        on_fire(generation, fire);
        slot = shared.slot();
    }
}
