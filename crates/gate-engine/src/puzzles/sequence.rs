//! Repeat-after-me: watch a growing sequence of symbols, then play it back.

use crate::api::challenge::{Challenge, ChallengeContext};
use crate::api::types::{Cue, Difficulty, Outcome, PuzzleEvent, PuzzleKind, Symbol};
use crate::config::{ConfigError, SequenceTuning};
use crate::core::schedule::Scheduler;
use crate::input::queue::PuzzleInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    Idle,
    /// Playing the sequence back to the player. Input other than cancel is dropped.
    Presenting,
    /// Waiting for the player to repeat the sequence.
    AwaitingInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackStep {
    Show(usize),
    Hide(usize),
    Done,
}

pub struct SequenceChallenge {
    tuning: SequenceTuning,
    phase: SequencePhase,
    sequence: Vec<Symbol>,
    /// Next position the player has to hit.
    cursor: usize,
    mistakes: u32,
    target_len: usize,
    reveal: f32,
    max_mistakes: u32,
    highlighted: Option<Symbol>,
    playback: Scheduler<PlaybackStep>,
    fired: Vec<PlaybackStep>,
}

impl SequenceChallenge {
    pub fn new(tuning: SequenceTuning) -> Self {
        Self {
            tuning,
            phase: SequencePhase::Idle,
            sequence: Vec::new(),
            cursor: 0,
            mistakes: 0,
            target_len: 0,
            reveal: 0.0,
            max_mistakes: 0,
            highlighted: None,
            playback: Scheduler::new(),
            fired: Vec::new(),
        }
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// The generated sequence. Kept after the run ends; cleared on the next activation.
    pub fn sequence(&self) -> &[Symbol] {
        &self.sequence
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn max_mistakes(&self) -> u32 {
        self.max_mistakes
    }

    pub fn target_len(&self) -> usize {
        self.target_len
    }

    /// Symbol lit during playback, if any.
    pub fn highlighted(&self) -> Option<Symbol> {
        self.highlighted
    }

    pub fn tuning(&self) -> &SequenceTuning {
        &self.tuning
    }

    fn random_symbol(&self, ctx: &mut ChallengeContext) -> Symbol {
        Symbol(ctx.rng().next_int(u32::from(self.tuning.alphabet)) as u8)
    }

    /// Queue a full playback of the current sequence and enter `Presenting`.
    fn start_playback(&mut self, ctx: &mut ChallengeContext) {
        self.phase = SequencePhase::Presenting;
        self.cursor = 0;
        self.highlighted = None;
        self.playback.clear();

        for index in 0..self.sequence.len() {
            let delay = if index == 0 {
                self.tuning.lead_in_seconds
            } else {
                self.tuning.gap_seconds
            };
            self.playback.then(delay, PlaybackStep::Show(index));
            self.playback.then(self.reveal, PlaybackStep::Hide(index));
        }
        self.playback.then(self.tuning.gap_seconds, PlaybackStep::Done);

        ctx.emit(PuzzleEvent::RoundStarted {
            length: self.sequence.len(),
        });
    }

    fn apply(&mut self, step: PlaybackStep, ctx: &mut ChallengeContext) {
        match step {
            PlaybackStep::Show(index) => {
                let symbol = self.sequence[index];
                self.highlighted = Some(symbol);
                ctx.play(Cue::Symbol(symbol));
                ctx.emit(PuzzleEvent::SymbolShown { symbol, index });
            }
            PlaybackStep::Hide(index) => {
                self.highlighted = None;
                ctx.emit(PuzzleEvent::SymbolHidden {
                    symbol: self.sequence[index],
                });
            }
            PlaybackStep::Done => {
                self.cursor = 0;
                self.phase = SequencePhase::AwaitingInput;
            }
        }
    }

    fn press(&mut self, symbol: Symbol, ctx: &mut ChallengeContext) -> Option<Outcome> {
        if symbol.0 >= self.tuning.alphabet {
            return None;
        }

        if symbol == self.sequence[self.cursor] {
            ctx.play(Cue::Symbol(symbol));
            ctx.emit(PuzzleEvent::InputAccepted {
                symbol,
                position: self.cursor,
            });
            self.cursor += 1;

            if self.cursor == self.sequence.len() {
                if self.sequence.len() >= self.target_len {
                    log::debug!("sequence: cleared final round of length {}", self.sequence.len());
                    ctx.play(Cue::Solved);
                    self.stop();
                    return Some(Outcome::Solved);
                }
                ctx.play(Cue::Accept);
                let next = self.random_symbol(ctx);
                self.sequence.push(next);
                log::debug!("sequence: round cleared, growing to {}", self.sequence.len());
                self.start_playback(ctx);
            }
            return None;
        }

        self.mistakes += 1;
        ctx.play(Cue::Mistake);
        ctx.emit(PuzzleEvent::Mistake {
            mistakes: self.mistakes,
            allowed: self.max_mistakes,
        });
        if self.mistakes >= self.max_mistakes {
            ctx.play(Cue::Failed);
            self.stop();
            return Some(Outcome::Failed);
        }
        self.start_playback(ctx);
        None
    }

    fn stop(&mut self) {
        self.phase = SequencePhase::Idle;
        self.highlighted = None;
        self.playback.clear();
    }
}

impl Challenge for SequenceChallenge {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Sequence
    }

    fn activate(&mut self, difficulty: Difficulty, ctx: &mut ChallengeContext) -> Result<(), ConfigError> {
        self.stop();
        self.tuning.validate()?;

        self.mistakes = 0;
        self.target_len = self.tuning.target_len(difficulty);
        self.reveal = self.tuning.reveal_duration(difficulty);
        self.max_mistakes = self.tuning.max_mistakes(difficulty);

        let start_len = self.tuning.start_len(difficulty);
        self.sequence.clear();
        for _ in 0..start_len {
            let symbol = self.random_symbol(ctx);
            self.sequence.push(symbol);
        }

        self.start_playback(ctx);
        Ok(())
    }

    fn update(&mut self, ctx: &mut ChallengeContext, input: &[PuzzleInput], dt: f32) -> Option<Outcome> {
        if self.phase == SequencePhase::Idle {
            return None;
        }

        for &event in input {
            match event {
                PuzzleInput::Cancel => {
                    self.cancel(ctx);
                    return Some(Outcome::Cancelled);
                }
                PuzzleInput::Symbol(symbol) if self.phase == SequencePhase::AwaitingInput => {
                    if let Some(outcome) = self.press(symbol, ctx) {
                        return Some(outcome);
                    }
                }
                _ => {}
            }
        }

        let mut fired = std::mem::take(&mut self.fired);
        self.playback.tick(dt, &mut fired);
        for step in fired.drain(..) {
            self.apply(step, ctx);
        }
        self.fired = fired;
        None
    }

    fn cancel(&mut self, ctx: &mut ChallengeContext) {
        if self.phase != SequencePhase::Idle {
            ctx.play(Cue::Cancelled);
            self.stop();
        }
    }

    fn is_active(&self) -> bool {
        self.phase != SequencePhase::Idle
    }
}
