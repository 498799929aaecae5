//! Owns the three puzzles and runs at most one session at a time.

use std::rc::Rc;

use thiserror::Error;

use crate::api::challenge::{Challenge, ChallengeContext};
use crate::api::services::{AudioCue, HostPause};
use crate::api::types::{Difficulty, Outcome, PuzzleEvent, PuzzleKind};
use crate::config::{ConfigError, PuzzleConfig};
use crate::core::rng::RandomSource;
use crate::input::queue::PuzzleInput;
use crate::puzzles::matching::MatchChallenge;
use crate::puzzles::sequence::SequenceChallenge;
use crate::puzzles::timing::TimingChallenge;
use crate::session::{Completion, PauseGuard, Session};

/// Why [`PuzzleDispatcher::start`] did not begin a session.
///
/// Informational: the request's `on_cancelled` has already fired and the
/// host is not paused.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{requested:?} puzzle requested while a {active:?} session is running")]
    Busy { active: PuzzleKind, requested: PuzzleKind },
    #[error("no {0:?} puzzle is registered")]
    Unavailable(PuzzleKind),
    #[error("{kind:?} puzzle is misconfigured: {source}")]
    Config {
        kind: PuzzleKind,
        #[source]
        source: ConfigError,
    },
}

#[derive(Default)]
struct Slots {
    sequence: Option<SequenceChallenge>,
    matching: Option<MatchChallenge>,
    timing: Option<TimingChallenge>,
}

impl Slots {
    fn get_mut(&mut self, kind: PuzzleKind) -> Option<&mut dyn Challenge> {
        match kind {
            PuzzleKind::Sequence => self.sequence.as_mut().map(|c| c as &mut dyn Challenge),
            PuzzleKind::Match => self.matching.as_mut().map(|c| c as &mut dyn Challenge),
            PuzzleKind::Timing => self.timing.as_mut().map(|c| c as &mut dyn Challenge),
        }
    }
}

/// Entry point for the host: start a puzzle, feed it frames and input, and
/// get exactly one of the two callbacks back.
///
/// Callbacks run while the dispatcher is mutably borrowed. A host that wants
/// to chain sessions from a callback should defer the next `start` (the web
/// runner queues callbacks until its tick returns). The host pause is always
/// released before the callback runs.
pub struct PuzzleDispatcher {
    host: Rc<dyn HostPause>,
    audio: Box<dyn AudioCue>,
    ctx: ChallengeContext,
    slots: Slots,
    session: Option<Session>,
}

impl PuzzleDispatcher {
    /// An empty dispatcher. Register puzzles with the `with_*` builders.
    pub fn new(host: Rc<dyn HostPause>, audio: Box<dyn AudioCue>, rng: Box<dyn RandomSource>) -> Self {
        Self {
            host,
            audio,
            ctx: ChallengeContext::new(rng),
            slots: Slots::default(),
            session: None,
        }
    }

    /// A dispatcher with all three puzzles tuned by `config`.
    pub fn with_config(
        config: &PuzzleConfig,
        host: Rc<dyn HostPause>,
        audio: Box<dyn AudioCue>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self::new(host, audio, rng)
            .with_sequence(SequenceChallenge::new(config.sequence.clone()))
            .with_matching(MatchChallenge::new(config.matching.clone()))
            .with_timing(TimingChallenge::new(config.timing.clone()))
    }

    pub fn with_sequence(mut self, challenge: SequenceChallenge) -> Self {
        self.slots.sequence = Some(challenge);
        self
    }

    pub fn with_matching(mut self, challenge: MatchChallenge) -> Self {
        self.slots.matching = Some(challenge);
        self
    }

    pub fn with_timing(mut self, challenge: TimingChallenge) -> Self {
        self.slots.timing = Some(challenge);
        self
    }

    /// Retune every registered puzzle. Refused while a session runs.
    pub fn reconfigure(&mut self, config: &PuzzleConfig) -> bool {
        if let Some(session) = &self.session {
            log::warn!("puzzle config not applied: {:?} session running", session.kind());
            return false;
        }
        self.slots = Slots {
            sequence: Some(SequenceChallenge::new(config.sequence.clone())),
            matching: Some(MatchChallenge::new(config.matching.clone())),
            timing: Some(TimingChallenge::new(config.timing.clone())),
        };
        true
    }

    /// Begin a session: activate the puzzle, pause the host, and hold on to
    /// the callbacks until the session ends.
    ///
    /// Never starts a second session. On any `Err`, `on_cancelled` has
    /// already fired and the host is left unpaused.
    pub fn start(
        &mut self,
        kind: PuzzleKind,
        difficulty: Difficulty,
        on_solved: impl FnOnce() + 'static,
        on_cancelled: impl FnOnce() + 'static,
    ) -> Result<(), DispatchError> {
        let completion = Completion::new(on_solved, on_cancelled);

        if let Some(session) = &self.session {
            let active = session.kind();
            log::warn!("{:?} puzzle rejected: {:?} session already running", kind, active);
            completion.resolve(Outcome::Cancelled);
            return Err(DispatchError::Busy { active, requested: kind });
        }

        let Some(challenge) = self.slots.get_mut(kind) else {
            log::warn!("{:?} puzzle unavailable", kind);
            completion.resolve(Outcome::Cancelled);
            return Err(DispatchError::Unavailable(kind));
        };

        debug_assert_eq!(challenge.kind(), kind);
        let pause = PauseGuard::new(self.host.clone());
        self.ctx.emit(PuzzleEvent::SessionStarted { kind, difficulty });
        if let Err(source) = challenge.activate(difficulty, &mut self.ctx) {
            log::error!("{:?} puzzle failed to start: {}", kind, source);
            self.ctx.emit(PuzzleEvent::SessionEnded {
                kind,
                outcome: Outcome::Cancelled,
            });
            drop(pause);
            completion.resolve(Outcome::Cancelled);
            return Err(DispatchError::Config { kind, source });
        }

        log::info!("{:?} puzzle started at difficulty {}", kind, difficulty.level());
        self.session = Some(Session::new(kind, difficulty, pause, completion));
        self.flush_audio();
        Ok(())
    }

    /// Advance the active puzzle by `dt` seconds of real time, feeding it this
    /// frame's input. Returns the outcome on the frame the session ends.
    ///
    /// The host's own pause does not stop this clock.
    pub fn update(&mut self, dt: f32, input: &[PuzzleInput]) -> Option<Outcome> {
        let kind = self.session.as_ref()?.kind();
        let outcome = match self.slots.get_mut(kind) {
            Some(challenge) => challenge.update(&mut self.ctx, input, dt),
            None => {
                log::error!("{:?} puzzle vanished mid-session", kind);
                Some(Outcome::Cancelled)
            }
        };
        self.flush_audio();
        if let Some(outcome) = outcome {
            self.finish(outcome);
        }
        outcome
    }

    /// End the active session as cancelled (e.g. the host window lost focus).
    pub fn cancel(&mut self) {
        let Some(kind) = self.session.as_ref().map(Session::kind) else {
            return;
        };
        if let Some(challenge) = self.slots.get_mut(kind) {
            challenge.cancel(&mut self.ctx);
        }
        self.flush_audio();
        self.finish(Outcome::Cancelled);
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_kind(&self) -> Option<PuzzleKind> {
        self.session.as_ref().map(Session::kind)
    }

    pub fn active_difficulty(&self) -> Option<Difficulty> {
        self.session.as_ref().map(Session::difficulty)
    }

    /// Presentation events queued since the last drain. Call once per frame;
    /// an undrained queue is capped and loses its oldest events.
    pub fn drain_events(&mut self) -> Vec<PuzzleEvent> {
        self.ctx.drain_events()
    }

    pub fn sequence(&self) -> Option<&SequenceChallenge> {
        self.slots.sequence.as_ref()
    }

    pub fn matching(&self) -> Option<&MatchChallenge> {
        self.slots.matching.as_ref()
    }

    pub fn timing(&self) -> Option<&TimingChallenge> {
        self.slots.timing.as_ref()
    }

    fn finish(&mut self, outcome: Outcome) {
        let Some(session) = self.session.take() else {
            return;
        };
        let kind = session.kind();
        log::info!("{:?} puzzle ended: {:?}", kind, outcome);
        self.ctx.emit(PuzzleEvent::SessionEnded { kind, outcome });
        session.finish(outcome);
    }

    fn flush_audio(&mut self) {
        for sound in self.ctx.sounds.drain(..) {
            self.audio.play(sound);
        }
    }
}

impl Drop for PuzzleDispatcher {
    fn drop(&mut self) {
        if self.session.is_some() {
            log::warn!("puzzle dispatcher dropped mid-session");
            self.cancel();
        }
    }
}
