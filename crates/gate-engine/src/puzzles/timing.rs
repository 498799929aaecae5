//! Rhythm gate: press while the sweeping indicator is inside the target zone.

use crate::api::challenge::{Challenge, ChallengeContext};
use crate::api::types::{Cue, Difficulty, Outcome, PuzzleEvent, PuzzleKind};
use crate::config::{ConfigError, TimingTuning};
use crate::extensions::easing::{ping_pong, Easing};
use crate::input::queue::PuzzleInput;

/// Indicator sweeping back and forth across a 0..1 track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Track {
    /// Sweeps travelled, folded into [0, 2).
    phase: f32,
    speed: f32,
    zone: (f32, f32),
    easing: Easing,
}

impl Track {
    pub fn new(speed: f32, zone: (f32, f32), easing: Easing) -> Self {
        Self {
            phase: 0.0,
            speed,
            zone,
            easing,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.phase = (self.phase + self.speed * dt).rem_euclid(2.0);
        }
    }

    /// Indicator position on the track, always within [0, 1].
    pub fn position(&self) -> f32 {
        self.easing.apply(ping_pong(self.phase))
    }

    pub fn zone(&self) -> (f32, f32) {
        self.zone
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn in_zone(&self) -> bool {
        let position = self.position();
        position >= self.zone.0 && position <= self.zone.1
    }
}

impl Default for Track {
    fn default() -> Self {
        Self::new(0.0, (0.0, 0.0), Easing::Linear)
    }
}

pub struct TimingChallenge {
    tuning: TimingTuning,
    active: bool,
    track: Track,
    hits: u32,
    attempts: u32,
    required_hits: u32,
    max_attempts: u32,
    /// Seconds until the next trigger is accepted.
    cooldown: f32,
}

impl TimingChallenge {
    pub fn new(tuning: TimingTuning) -> Self {
        Self {
            tuning,
            active: false,
            track: Track::default(),
            hits: 0,
            attempts: 0,
            required_hits: 0,
            max_attempts: 0,
            cooldown: 0.0,
        }
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn required_hits(&self) -> u32 {
        self.required_hits
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether a trigger right now would count as an attempt.
    pub fn ready(&self) -> bool {
        self.active && self.cooldown <= 0.0
    }

    fn trigger(&mut self, ctx: &mut ChallengeContext) -> Option<Outcome> {
        let hit = self.track.in_zone();
        self.attempts += 1;
        if hit {
            self.hits += 1;
        }
        self.cooldown = self.tuning.trigger_cooldown_seconds.max(0.0);
        ctx.play(if hit { Cue::Hit } else { Cue::Miss });
        ctx.emit(PuzzleEvent::AttemptResolved {
            hit,
            hits: self.hits,
            attempts: self.attempts,
        });
        log::debug!(
            "timing: {} at {:.3} ({}/{} hits, {}/{} attempts)",
            if hit { "hit" } else { "miss" },
            self.track.position(),
            self.hits,
            self.required_hits,
            self.attempts,
            self.max_attempts
        );

        if self.hits >= self.required_hits {
            ctx.play(Cue::Solved);
            self.active = false;
            return Some(Outcome::Solved);
        }
        if self.attempts >= self.max_attempts {
            ctx.play(Cue::Failed);
            self.active = false;
            return Some(Outcome::Failed);
        }
        None
    }
}

impl Challenge for TimingChallenge {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Timing
    }

    fn activate(&mut self, difficulty: Difficulty, _ctx: &mut ChallengeContext) -> Result<(), ConfigError> {
        self.active = false;
        self.tuning.validate()?;

        self.track = Track::new(
            self.tuning.speed(difficulty),
            self.tuning.zone(difficulty),
            self.tuning.easing,
        );
        self.hits = 0;
        self.attempts = 0;
        self.required_hits = self.tuning.required_hits;
        self.max_attempts = self.tuning.max_attempts;
        self.cooldown = 0.0;
        self.active = true;
        Ok(())
    }

    fn update(&mut self, ctx: &mut ChallengeContext, input: &[PuzzleInput], dt: f32) -> Option<Outcome> {
        if !self.active {
            return None;
        }

        let mut triggered = false;
        for &event in input {
            match event {
                PuzzleInput::Cancel => {
                    self.cancel(ctx);
                    return Some(Outcome::Cancelled);
                }
                // One attempt per frame at most, and none during the cooldown.
                PuzzleInput::Confirm if !triggered && self.cooldown <= 0.0 => {
                    triggered = true;
                    if let Some(outcome) = self.trigger(ctx) {
                        return Some(outcome);
                    }
                }
                _ => {}
            }
        }

        if dt.is_finite() && dt > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
        self.track.advance(dt);
        None
    }

    fn cancel(&mut self, ctx: &mut ChallengeContext) {
        if self.active {
            ctx.play(Cue::Cancelled);
            self.active = false;
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(tuning: TimingTuning, difficulty: Difficulty) -> (TimingChallenge, ChallengeContext) {
        let mut ctx = ChallengeContext::seeded(3);
        let mut challenge = TimingChallenge::new(tuning);
        challenge.activate(difficulty, &mut ctx).unwrap();
        (challenge, ctx)
    }

    /// Let the indicator run until a trigger would land (or miss) as wanted, then trigger.
    fn trigger_when(challenge: &mut TimingChallenge, ctx: &mut ChallengeContext, hit: bool) -> Option<Outcome> {
        for _ in 0..10_000 {
            if challenge.ready() && challenge.track().in_zone() == hit {
                return challenge.update(ctx, &[PuzzleInput::Confirm], 0.0);
            }
            challenge.update(ctx, &[], 0.01);
        }
        panic!("indicator never reached the wanted side of the zone");
    }

    #[test]
    fn indicator_sweeps_back_and_forth() {
        let mut track = Track::new(1.0, (0.4, 0.6), Easing::Linear);
        assert_eq!(track.position(), 0.0);
        track.advance(0.25);
        assert!((track.position() - 0.25).abs() < 1e-5);
        track.advance(1.0);
        assert!((track.position() - 0.75).abs() < 1e-5);
        track.advance(0.75);
        assert!(track.position().abs() < 1e-5);
    }

    #[test]
    fn indicator_stays_on_track_for_every_easing() {
        for easing in [Easing::Linear, Easing::QuadInOut, Easing::CubicInOut, Easing::SineInOut] {
            let mut track = Track::new(1.7, (0.4, 0.6), easing);
            for _ in 0..500 {
                track.advance(0.013);
                let position = track.position();
                assert!((0.0..=1.0).contains(&position), "{:?} left the track: {}", easing, position);
            }
        }
    }

    #[test]
    fn difficulty_speeds_up_and_narrows() {
        let (easy, _) = setup(TimingTuning::default(), Difficulty::EASY);
        let (hard, _) = setup(TimingTuning::default(), Difficulty::HARD);
        assert!(hard.track().speed() > easy.track().speed());
        let width = |t: &Track| t.zone().1 - t.zone().0;
        assert!(width(hard.track()) < width(easy.track()));
    }

    #[test]
    fn required_hits_solve() {
        let (mut challenge, mut ctx) = setup(TimingTuning::default(), Difficulty::NORMAL);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), None);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, false), None);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), None);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), Some(Outcome::Solved));
        assert_eq!(challenge.hits(), 3);
        assert_eq!(challenge.attempts(), 4);
        assert!(!challenge.is_active());
    }

    #[test]
    fn running_out_of_attempts_fails() {
        let (mut challenge, mut ctx) = setup(TimingTuning::default(), Difficulty::EASY);
        for hit in [false, true, false, true] {
            assert_eq!(trigger_when(&mut challenge, &mut ctx, hit), None);
        }
        assert_eq!(trigger_when(&mut challenge, &mut ctx, false), Some(Outcome::Failed));
        assert_eq!(challenge.hits(), 2);
        assert_eq!(challenge.attempts(), 5);
    }

    #[test]
    fn all_attempts_must_hit_when_required_equals_max() {
        let tuning = TimingTuning {
            required_hits: 3,
            max_attempts: 3,
            ..TimingTuning::default()
        };
        let (mut challenge, mut ctx) = setup(tuning.clone(), Difficulty::EASY);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), None);
        assert_eq!(trigger_when(&mut challenge, &mut ctx, false), None);
        // One miss already sealed it: the last hit cannot save the run.
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), Some(Outcome::Failed));
        assert_eq!(challenge.hits(), 2);

        let (mut challenge, mut ctx) = setup(tuning, Difficulty::EASY);
        for _ in 0..2 {
            assert_eq!(trigger_when(&mut challenge, &mut ctx, true), None);
        }
        assert_eq!(trigger_when(&mut challenge, &mut ctx, true), Some(Outcome::Solved));
    }

    #[test]
    fn counters_never_exceed_their_bounds() {
        let (mut challenge, mut ctx) = setup(TimingTuning::default(), Difficulty::HARD);
        let pattern = [true, false, false, true, false];
        for hit in pattern {
            let outcome = trigger_when(&mut challenge, &mut ctx, hit);
            assert!(challenge.hits() <= challenge.attempts());
            assert!(challenge.attempts() <= challenge.max_attempts());
            if outcome.is_some() {
                break;
            }
        }
        assert!(!challenge.is_active());
    }

    #[test]
    fn rapid_triggers_are_debounced() {
        let (mut challenge, mut ctx) = setup(TimingTuning::default(), Difficulty::EASY);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm, PuzzleInput::Confirm, PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.attempts(), 1);

        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.1);
        assert_eq!(challenge.attempts(), 1);
        assert!(!challenge.ready());

        challenge.update(&mut ctx, &[], 0.15);
        assert!(challenge.ready());
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.attempts(), 2);
    }

    #[test]
    fn indicator_keeps_moving_without_input_and_cancel_stops_it() {
        let (mut challenge, mut ctx) = setup(TimingTuning::default(), Difficulty::EASY);
        let before = challenge.track().position();
        challenge.update(&mut ctx, &[], 0.3);
        assert_ne!(challenge.track().position(), before);

        assert_eq!(challenge.update(&mut ctx, &[PuzzleInput::Cancel], 0.0), Some(Outcome::Cancelled));
        assert!(!challenge.is_active());
        let frozen = challenge.track().position();
        assert_eq!(challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.3), None);
        assert_eq!(challenge.track().position(), frozen);
        assert_eq!(challenge.attempts(), 0);
    }

    #[test]
    fn impossible_hit_target_is_a_config_error() {
        let mut ctx = ChallengeContext::seeded(1);
        let mut challenge = TimingChallenge::new(TimingTuning {
            required_hits: 6,
            max_attempts: 5,
            ..TimingTuning::default()
        });
        assert!(matches!(
            challenge.activate(Difficulty::EASY, &mut ctx),
            Err(ConfigError::InvalidHitTarget { .. })
        ));
        assert!(!challenge.is_active());
    }
}
