pub mod api;
pub mod core;
pub mod input;
pub mod extensions;
pub mod config;
pub mod puzzles;
pub mod session;
pub mod dispatcher;

// Re-export key types at crate root for convenience
pub use api::challenge::{Challenge, ChallengeContext};
pub use api::services::{AudioCue, HostPause, SilentAudio};
pub use api::types::{Cue, Difficulty, EventRecord, Outcome, PuzzleEvent, PuzzleKind, SoundEvent, Symbol};
pub use config::{ConfigError, MatchTuning, PuzzleConfig, SequenceTuning, TimingTuning};
pub use core::rng::{default_source, shuffle, RandomSource, Rng};
pub use core::schedule::Scheduler;
pub use core::time::FrameClock;
pub use input::bindings::KeyBindings;
pub use input::queue::{Direction, InputQueue, PuzzleInput};
pub use dispatcher::{DispatchError, PuzzleDispatcher};
pub use session::{Completion, PauseGuard, Session};
pub use puzzles::matching::{Board, Cell, MatchChallenge, MatchPhase};
pub use puzzles::sequence::{SequenceChallenge, SequencePhase};
pub use puzzles::timing::{TimingChallenge, Track};

// Extensions
pub use extensions::{ping_pong, Easing};
