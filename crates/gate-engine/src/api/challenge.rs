use crate::api::types::{Cue, Difficulty, Outcome, PuzzleEvent, PuzzleKind, SoundEvent};
use crate::config::ConfigError;
use crate::core::rng::{RandomSource, Rng};
use crate::input::queue::PuzzleInput;

/// The lifecycle contract every puzzle fulfils.
///
/// Puzzles are stepped state machines. They never call back into the host:
/// they report a terminal [`Outcome`] from `update`, and the dispatcher turns
/// that into the host's callbacks and the pause/resume handshake.
pub trait Challenge {
    fn kind(&self) -> PuzzleKind;

    /// Reset all state and begin a new run.
    ///
    /// On `Err` the puzzle stays idle and the caller resolves the session as cancelled.
    fn activate(&mut self, difficulty: Difficulty, ctx: &mut ChallengeContext) -> Result<(), ConfigError>;

    /// Consume this frame's input, then advance timed phases by `dt` seconds of
    /// real time. Returns `Some` exactly once per run, on the frame it ends;
    /// the puzzle is idle afterwards.
    ///
    /// Input that arrives while the puzzle is not accepting it is dropped, not queued.
    fn update(&mut self, ctx: &mut ChallengeContext, input: &[PuzzleInput], dt: f32) -> Option<Outcome>;

    /// Abandon the run immediately (pending waits are dropped, not finished).
    fn cancel(&mut self, ctx: &mut ChallengeContext);

    fn is_active(&self) -> bool;
}

/// Undrained presentation events kept before the oldest are discarded.
pub const MAX_QUEUED_EVENTS: usize = 1024;

/// Mutable per-frame state shared between the dispatcher and the active puzzle.
pub struct ChallengeContext {
    /// Sounds queued this frame, forwarded to the host's audio service.
    pub sounds: Vec<SoundEvent>,
    /// Presentation events queued since the host last drained them. Hosts
    /// should drain once per frame; past [`MAX_QUEUED_EVENTS`] the oldest half
    /// is dropped.
    pub events: Vec<PuzzleEvent>,
    rng: Box<dyn RandomSource>,
}

impl ChallengeContext {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Self {
            sounds: Vec::new(),
            events: Vec::new(),
            rng,
        }
    }

    /// Context backed by the built-in xorshift generator.
    pub fn seeded(seed: u64) -> Self {
        Self::new(Box::new(Rng::new(seed)))
    }

    pub fn rng(&mut self) -> &mut dyn RandomSource {
        self.rng.as_mut()
    }

    /// Queue an audio cue.
    pub fn play(&mut self, cue: Cue) {
        self.sounds.push(cue.sound());
    }

    /// Queue a presentation event.
    pub fn emit(&mut self, event: PuzzleEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            log::warn!("puzzle events not drained; dropping the oldest {}", MAX_QUEUED_EVENTS / 2);
            self.events.drain(..MAX_QUEUED_EVENTS / 2);
        }
        self.events.push(event);
    }

    /// Take every queued presentation event.
    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        std::mem::take(&mut self.events)
    }
}
