//! Host-side collaborators, handed to the dispatcher at construction.

use crate::api::types::SoundEvent;

/// Pauses and resumes the host simulation (and ducks its audio).
///
/// A puzzle session calls `begin` once when it starts and `end` once when it
/// ends, whatever the outcome. Takes `&self` because the session holds the
/// service for its whole lifetime; implementations use interior mutability.
pub trait HostPause {
    fn begin(&self);
    fn end(&self);
}

/// Fire-and-forget sound playback.
pub trait AudioCue {
    fn play(&mut self, sound: SoundEvent);
}

/// Audio sink that drops every cue. For hosts without sound and for tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudio;

impl AudioCue for SilentAudio {
    fn play(&mut self, _sound: SoundEvent) {}
}
