//! One activation-to-termination run: the host's two callbacks and the
//! pause/resume handshake, both tied to ownership so every exit path
//! (solved, failed, cancelled, configuration error, dropped) unwinds them.

use std::rc::Rc;

use crate::api::services::HostPause;
use crate::api::types::{Difficulty, Outcome, PuzzleKind};

type Callback = Box<dyn FnOnce()>;

/// The host's `on_solved` / `on_cancelled` pair. Exactly one of them fires,
/// exactly once: on [`Completion::resolve`], or `on_cancelled` on drop.
pub struct Completion {
    on_solved: Option<Callback>,
    on_cancelled: Option<Callback>,
}

impl Completion {
    pub fn new(on_solved: impl FnOnce() + 'static, on_cancelled: impl FnOnce() + 'static) -> Self {
        Self {
            on_solved: Some(Box::new(on_solved)),
            on_cancelled: Some(Box::new(on_cancelled)),
        }
    }

    /// Fire the callback for `outcome`. `Failed` reports as cancelled.
    pub fn resolve(mut self, outcome: Outcome) {
        let solved = self.on_solved.take();
        let cancelled = self.on_cancelled.take();
        let callback = if outcome.is_solved() { solved } else { cancelled };
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        self.on_solved = None;
        if let Some(callback) = self.on_cancelled.take() {
            callback();
        }
    }
}

/// Holds the host paused for as long as it lives.
pub struct PauseGuard {
    host: Rc<dyn HostPause>,
}

impl PauseGuard {
    pub fn new(host: Rc<dyn HostPause>) -> Self {
        host.begin();
        Self { host }
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.host.end();
    }
}

/// A running puzzle session.
///
/// Field order matters: on drop the pause is released before `on_cancelled`
/// fires, the same order [`Session::finish`] uses.
pub struct Session {
    kind: PuzzleKind,
    difficulty: Difficulty,
    pause: PauseGuard,
    completion: Completion,
}

impl Session {
    pub fn new(kind: PuzzleKind, difficulty: Difficulty, pause: PauseGuard, completion: Completion) -> Self {
        Self {
            kind,
            difficulty,
            pause,
            completion,
        }
    }

    pub fn kind(&self) -> PuzzleKind {
        self.kind
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Resume the host, then report `outcome`.
    pub fn finish(self, outcome: Outcome) {
        let Session { pause, completion, .. } = self;
        drop(pause);
        completion.resolve(outcome);
    }
}
