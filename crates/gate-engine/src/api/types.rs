use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Difficulty level requested by the host. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASY: Difficulty = Difficulty(1);
    pub const NORMAL: Difficulty = Difficulty(2);
    pub const HARD: Difficulty = Difficulty(3);

    /// Create a difficulty, clamping zero up to the easiest level.
    pub fn new(level: u8) -> Self {
        Self(level.max(1))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Number of steps above the easiest level. Tuning curves scale by this.
    pub fn steps(self) -> u32 {
        u32::from(self.0 - 1)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::EASY
    }
}

impl From<u32> for Difficulty {
    fn from(level: u32) -> Self {
        Self::new(level.min(u32::from(u8::MAX)) as u8)
    }
}

/// Abstract puzzle symbol (a note, a card face). Compared by value only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Symbol(pub u8);

impl Symbol {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The three challenge types the dispatcher knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleKind {
    /// Repeat a growing sequence of symbols.
    Sequence,
    /// Find matching pairs on a hidden board.
    Match,
    /// Trigger while a sweeping indicator is inside the target zone.
    Timing,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 3] = [PuzzleKind::Sequence, PuzzleKind::Match, PuzzleKind::Timing];

    /// Numeric code used across the JS bridge.
    pub fn code(self) -> u32 {
        match self {
            PuzzleKind::Sequence => 0,
            PuzzleKind::Match => 1,
            PuzzleKind::Timing => 2,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }
}

/// How a session ended.
///
/// `Failed` is reported to the host through the same callback as `Cancelled`;
/// the distinction only exists for logging and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Solved,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn is_solved(self) -> bool {
        self == Outcome::Solved
    }

    fn code(self) -> f32 {
        match self {
            Outcome::Solved => 0.0,
            Outcome::Failed => 1.0,
            Outcome::Cancelled => 2.0,
        }
    }
}

/// A sound event emitted by the puzzle logic.
/// The numeric value maps to a host-defined sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SoundEvent(pub u32);

/// First sound id reserved for per-symbol tones. Symbol `n` plays `SYMBOL_CUE_BASE + n`.
pub const SYMBOL_CUE_BASE: u32 = 16;

/// Named audio cues. Converted to [`SoundEvent`] ids before leaving the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Tone for a specific symbol (playback or player echo).
    Symbol(Symbol),
    Accept,
    Mistake,
    Flip,
    Match,
    Mismatch,
    Hit,
    Miss,
    Solved,
    Failed,
    Cancelled,
}

impl Cue {
    pub fn sound(self) -> SoundEvent {
        let id = match self {
            Cue::Symbol(symbol) => SYMBOL_CUE_BASE + u32::from(symbol.0),
            Cue::Accept => 1,
            Cue::Mistake => 2,
            Cue::Flip => 3,
            Cue::Match => 4,
            Cue::Mismatch => 5,
            Cue::Hit => 6,
            Cue::Miss => 7,
            Cue::Solved => 8,
            Cue::Failed => 9,
            Cue::Cancelled => 10,
        };
        SoundEvent(id)
    }
}

/// Everything a renderer needs to mirror puzzle state, emitted as it happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PuzzleEvent {
    SessionStarted { kind: PuzzleKind, difficulty: Difficulty },
    SessionEnded { kind: PuzzleKind, outcome: Outcome },

    // Sequence
    RoundStarted { length: usize },
    SymbolShown { symbol: Symbol, index: usize },
    SymbolHidden { symbol: Symbol },
    InputAccepted { symbol: Symbol, position: usize },
    Mistake { mistakes: u32, allowed: u32 },

    // Match
    BoardRevealed,
    BoardHidden,
    CursorMoved { index: usize },
    CellRevealed { index: usize, symbol: Symbol },
    PairMatched { first: usize, second: usize },
    PairMismatched { first: usize, second: usize },

    // Timing
    AttemptResolved { hit: bool, hits: u32, attempts: u32 },
}

/// Event kind codes for the wire form.
pub mod event_kind {
    pub const SESSION_STARTED: f32 = 1.0;
    pub const SESSION_ENDED: f32 = 2.0;
    pub const ROUND_STARTED: f32 = 10.0;
    pub const SYMBOL_SHOWN: f32 = 11.0;
    pub const SYMBOL_HIDDEN: f32 = 12.0;
    pub const INPUT_ACCEPTED: f32 = 13.0;
    pub const MISTAKE: f32 = 14.0;
    pub const BOARD_REVEALED: f32 = 20.0;
    pub const BOARD_HIDDEN: f32 = 21.0;
    pub const CURSOR_MOVED: f32 = 22.0;
    pub const CELL_REVEALED: f32 = 23.0;
    pub const PAIR_MATCHED: f32 = 24.0;
    pub const PAIR_MISMATCHED: f32 = 25.0;
    pub const ATTEMPT_RESOLVED: f32 = 30.0;
}

/// A puzzle event flattened for the JS bridge.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct EventRecord {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl EventRecord {
    pub const FLOATS: usize = 4;

    fn new(kind: f32, a: f32, b: f32, c: f32) -> Self {
        Self { kind, a, b, c }
    }
}

impl From<&PuzzleEvent> for EventRecord {
    fn from(event: &PuzzleEvent) -> Self {
        use event_kind::*;
        match *event {
            PuzzleEvent::SessionStarted { kind, difficulty } => {
                Self::new(SESSION_STARTED, kind.code() as f32, f32::from(difficulty.level()), 0.0)
            }
            PuzzleEvent::SessionEnded { kind, outcome } => {
                Self::new(SESSION_ENDED, kind.code() as f32, outcome.code(), 0.0)
            }
            PuzzleEvent::RoundStarted { length } => Self::new(ROUND_STARTED, length as f32, 0.0, 0.0),
            PuzzleEvent::SymbolShown { symbol, index } => {
                Self::new(SYMBOL_SHOWN, f32::from(symbol.0), index as f32, 0.0)
            }
            PuzzleEvent::SymbolHidden { symbol } => Self::new(SYMBOL_HIDDEN, f32::from(symbol.0), 0.0, 0.0),
            PuzzleEvent::InputAccepted { symbol, position } => {
                Self::new(INPUT_ACCEPTED, f32::from(symbol.0), position as f32, 0.0)
            }
            PuzzleEvent::Mistake { mistakes, allowed } => {
                Self::new(MISTAKE, mistakes as f32, allowed as f32, 0.0)
            }
            PuzzleEvent::BoardRevealed => Self::new(BOARD_REVEALED, 0.0, 0.0, 0.0),
            PuzzleEvent::BoardHidden => Self::new(BOARD_HIDDEN, 0.0, 0.0, 0.0),
            PuzzleEvent::CursorMoved { index } => Self::new(CURSOR_MOVED, index as f32, 0.0, 0.0),
            PuzzleEvent::CellRevealed { index, symbol } => {
                Self::new(CELL_REVEALED, index as f32, f32::from(symbol.0), 0.0)
            }
            PuzzleEvent::PairMatched { first, second } => {
                Self::new(PAIR_MATCHED, first as f32, second as f32, 0.0)
            }
            PuzzleEvent::PairMismatched { first, second } => {
                Self::new(PAIR_MISMATCHED, first as f32, second as f32, 0.0)
            }
            PuzzleEvent::AttemptResolved { hit, hits, attempts } => {
                Self::new(ATTEMPT_RESOLVED, if hit { 1.0 } else { 0.0 }, hits as f32, attempts as f32)
            }
        }
    }
}
