//! Ordered callback delivery
//!
//! Events are queued while the game lock is held, so queue order is state
//! order. Delivery happens after the lock is released, by exactly one thread
//! at a time: whoever finds the dispatcher idle drains the queue, everyone
//! else just leaves their events behind for it.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tetrecs_core::GameEvent;

use crate::listener::GameListener;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Game(GameEvent),
    Warning(usize),
}

#[derive(Default)]
pub(crate) struct Dispatcher {
    queue: Mutex<VecDeque<Notice>>,
    draining: AtomicBool,
    listeners: RwLock<Vec<Arc<dyn GameListener>>>,
}

impl Dispatcher {
    fn queue(&self) -> MutexGuard<'_, VecDeque<Notice>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn add_listener(&self, listener: Arc<dyn GameListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub(crate) fn enqueue(&self, notices: impl IntoIterator<Item = Notice>) {
        self.queue().extend(notices);
    }

    /// Deliver queued notices unless another thread already is
    pub(crate) fn drain(&self) {
        loop {
            if self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            loop {
                let next = self.queue().pop_front();
                match next {
                    Some(notice) => self.deliver(&notice),
                    None => break,
                }
            }
            self.draining.store(false, Ordering::Release);
            // A notice queued between the last pop and the release would
            // otherwise be stranded.
            if self.queue().is_empty() {
                return;
            }
        }
    }

    fn deliver(&self, notice: &Notice) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            match notice {
                Notice::Game(GameEvent::NextPiece { current, following }) => {
                    listener.on_next_piece(current, following)
                }
                Notice::Game(GameEvent::LinesCleared { coords, score }) => {
                    listener.on_line_cleared(coords, score)
                }
                Notice::Game(GameEvent::TurnStarted { delay }) => listener.on_tick(*delay),
                Notice::Game(GameEvent::GameOver { score }) => listener.on_game_over(*score),
                Notice::Warning(stage) => listener.on_timer_warning(*stage),
            }
        }
    }
}
