//! Game session - a [`GameState`] shared between callers and the turn timer
//!
//! Every operation takes the game lock, runs, turns the resulting events into
//! timer changes and listener notices, and releases the lock before any
//! listener runs. Timer expiries take the same lock and check that their
//! schedule is still current, so a tick can never land on top of a placement
//! that already restarted the turn.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tetrecs_core::{
    warning_offsets, GameError, GameEvent, GameSnapshot, GameState, PieceSource, ScoreList,
    TimerConfig,
};
use tetrecs_types::GameAction;

use crate::dispatch::{Dispatcher, Notice};
use crate::listener::GameListener;
use crate::timer::{TimerFire, TurnTimer};

/// Retry interval for a turn that expired while the piece source was dry
pub const UNDERRUN_RETRY: Duration = Duration::from_millis(100);

struct Inner<S> {
    state: Mutex<GameState<S>>,
    timer: TurnTimer,
    timer_config: TimerConfig,
    dispatcher: Dispatcher,
    stopped: AtomicBool,
}

impl<S: PieceSource> Inner<S> {
    fn lock(&self) -> MutexGuard<'_, GameState<S>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply drained events to the timer and queue them for listeners.
    /// Must run under the game lock.
    fn absorb(&self, state: &mut GameState<S>) {
        let events = state.take_events();
        for event in &events {
            match event {
                GameEvent::TurnStarted { delay } => {
                    self.timer
                        .schedule(*delay, &warning_offsets(&self.timer_config, *delay));
                }
                GameEvent::GameOver { score } => {
                    println!("[Game] Game over with score {score}");
                    self.timer.cancel();
                }
                _ => {}
            }
        }
        self.dispatcher.enqueue(events.into_iter().map(Notice::Game));
    }

    fn on_timer(&self, generation: u64, fire: TimerFire) {
        let mut state = self.lock();
        if !self.timer.is_current(generation) {
            return;
        }
        match fire {
            TimerFire::Warning(stage) => {
                self.dispatcher.enqueue([Notice::Warning(stage)]);
            }
            TimerFire::Expired => {
                if let Err(err) = state.tick() {
                    eprintln!("[Timer] Turn expired but {err}; retrying");
                    self.timer.schedule(UNDERRUN_RETRY, &[]);
                }
            }
        }
        self.absorb(&mut state);
        drop(state);
        self.dispatcher.drain();
    }
}

/// Thread-safe handle to a running game
///
/// Cloning gives another handle to the same game.
pub struct GameSession<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for GameSession<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: PieceSource + Send + 'static> GameSession<S> {
    /// Wrap a game and spawn its timer thread
    ///
    /// The game is not started; call [`GameSession::start`] (local) or deal
    /// pieces through [`GameSession::with_state`] (networked).
    pub fn new(game: GameState<S>) -> io::Result<Self> {
        let timer_config = game.config().timer;
        let inner = Arc::new(Inner {
            state: Mutex::new(game),
            timer: TurnTimer::new(),
            timer_config,
            dispatcher: Dispatcher::default(),
            stopped: AtomicBool::new(false),
        });

        let weak: Weak<Inner<S>> = Arc::downgrade(&inner);
        inner.timer.start(move |generation, fire| {
            if let Some(inner) = weak.upgrade() {
                inner.on_timer(generation, fire);
            }
        })?;

        Ok(Self { inner })
    }

    pub fn add_listener(&self, listener: Arc<dyn GameListener>) {
        self.inner.dispatcher.add_listener(listener);
    }

    /// Run `f` against the game under its lock, then apply timer changes and
    /// notify listeners
    pub fn with_state<R>(&self, f: impl FnOnce(&mut GameState<S>) -> R) -> R {
        let mut state = self.inner.lock();
        let result = f(&mut state);
        self.inner.absorb(&mut state);
        drop(state);
        self.inner.dispatcher.drain();
        result
    }

    /// Read-only access under the lock, without side effects
    pub fn read<R>(&self, f: impl FnOnce(&GameState<S>) -> R) -> R {
        f(&self.inner.lock())
    }

    /// Reset and deal the first two pieces; the first turn starts
    pub fn start(&self) -> Result<(), GameError> {
        println!("[Game] Starting");
        self.with_state(|game| game.start())
    }

    /// Reset values without dealing (networked games wait for pieces)
    pub fn initialise(&self) {
        self.with_state(|game| game.initialise());
    }

    pub fn place_at(&self, x: i32, y: i32) -> Result<bool, GameError> {
        self.with_state(|game| game.place_at(x, y))
    }

    pub fn rotate_current(&self) -> bool {
        self.with_state(|game| game.rotate_current())
    }

    pub fn rotate_current_ccw(&self) -> bool {
        self.with_state(|game| game.rotate_current_ccw())
    }

    pub fn swap_pieces(&self) -> bool {
        self.with_state(|game| game.swap_pieces())
    }

    pub fn apply_action(&self, action: GameAction) -> Result<bool, GameError> {
        self.with_state(|game| game.apply_action(action))
    }

    pub fn set_scores(&self, scores: ScoreList) {
        self.with_state(|game| game.set_scores(scores));
    }

    pub fn scores(&self) -> ScoreList {
        self.read(|game| game.scores().clone())
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.read(|game| game.snapshot())
    }

    pub fn is_over(&self) -> bool {
        self.read(|game| game.is_over())
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::Acquire)
    }

    /// End the session: cancel the timer, freeze the game and join the timer
    /// thread. Later operations are no-ops.
    pub fn stop(&self) {
        if self.inner.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        println!("[Game] Stopping");
        {
            let mut state = self.inner.lock();
            state.stop();
            self.inner.timer.cancel();
        }
        self.inner.timer.shutdown();
    }
}
