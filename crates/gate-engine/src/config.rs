//! Puzzle tuning: difficulty curves, board layout, timing windows and key bindings.
//!
//! Everything is data so a host can ship its own balance as JSON:
//!
//! ```json
//! { "sequence": { "base_length": 4 }, "matching": { "columns": 4, "rows": 4 } }
//! ```
//!
//! Missing fields fall back to the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::types::{Difficulty, SYMBOL_CUE_BASE};
use crate::extensions::easing::Easing;
use crate::input::bindings::KeyBindings;

/// Reasons a puzzle cannot be set up. A session that hits one of these is
/// resolved as cancelled straight away.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("match board needs an even, non-zero number of cells (got {columns}x{rows})")]
    InvalidBoard { columns: u32, rows: u32 },
    #[error("sequence alphabet must contain at least one symbol")]
    EmptyAlphabet,
    #[error("sequence alphabet of {alphabet} symbols exceeds the {max} sound ids available")]
    AlphabetTooLarge { alphabet: u8, max: u8 },
    #[error("sequence of length {length} exceeds the maximum of {max}")]
    SequenceTooLong { length: u32, max: u32 },
    #[error("`{field}` must be positive")]
    NonPositive { field: &'static str },
    #[error("`{field}` must be a finite, non-negative number")]
    Negative { field: &'static str },
    #[error("timing puzzle needs 1 <= required hits ({required}) <= max attempts ({attempts})")]
    InvalidHitTarget { required: u32, attempts: u32 },
    #[error("target zone [{start}, {end}] must lie inside the track")]
    InvalidZone { start: f32, end: f32 },
    #[error("failed to parse puzzle config: {0}")]
    Parse(#[from] serde_json::Error),
}

fn require_positive(value: f32, field: &'static str) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field })
    }
}

fn require_non_negative(value: f32, field: &'static str) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative { field })
    }
}

/// Longest sequence a run can reach, at any difficulty.
pub const MAX_SEQUENCE_LEN: u32 = 256;

/// Largest alphabet whose symbol tones still fit in a one-byte sound id.
pub const MAX_ALPHABET: u8 = (u8::MAX as u32 - SYMBOL_CUE_BASE + 1) as u8;

/// Complete puzzle configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleConfig {
    pub sequence: SequenceTuning,
    pub matching: MatchTuning,
    pub timing: TimingTuning,
    pub keys: KeyBindings,
}

impl PuzzleConfig {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sequence.validate()?;
        self.matching.validate()?;
        self.timing.validate()
    }
}

/// Sequence (repeat-after-me) tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTuning {
    /// Number of distinct symbols (pads).
    pub alphabet: u8,
    /// Sequence length at difficulty 1.
    pub base_length: u32,
    /// Extra starting length per difficulty step.
    pub length_step: u32,
    /// Rounds to clear beyond the starting length.
    pub extra_rounds: u32,
    /// How long each symbol is highlighted at difficulty 1.
    pub reveal_seconds: f32,
    pub reveal_step: f32,
    pub min_reveal_seconds: f32,
    /// Dark gap between two highlighted symbols.
    pub gap_seconds: f32,
    /// Pause before the first symbol of each playback.
    pub lead_in_seconds: f32,
    /// Mistakes that end the run at difficulty 1; one fewer per step, never below one.
    pub base_mistakes: u32,
}

impl Default for SequenceTuning {
    fn default() -> Self {
        Self {
            alphabet: 4,
            base_length: 3,
            length_step: 1,
            extra_rounds: 2,
            reveal_seconds: 0.6,
            reveal_step: 0.1,
            min_reveal_seconds: 0.25,
            gap_seconds: 0.25,
            lead_in_seconds: 0.5,
            base_mistakes: 3,
        }
    }
}

impl SequenceTuning {
    /// Capped at [`MAX_SEQUENCE_LEN`].
    pub fn start_len(&self, difficulty: Difficulty) -> usize {
        let len = self
            .base_length
            .max(1)
            .saturating_add(self.length_step.saturating_mul(difficulty.steps()));
        len.min(MAX_SEQUENCE_LEN) as usize
    }

    /// Capped at [`MAX_SEQUENCE_LEN`], and never below `start_len`.
    pub fn target_len(&self, difficulty: Difficulty) -> usize {
        let start = self.start_len(difficulty);
        start
            .saturating_add(self.extra_rounds as usize)
            .min(MAX_SEQUENCE_LEN as usize)
            .max(start)
    }

    pub fn reveal_duration(&self, difficulty: Difficulty) -> f32 {
        (self.reveal_seconds - self.reveal_step.max(0.0) * difficulty.steps() as f32)
            .max(self.min_reveal_seconds)
    }

    pub fn max_mistakes(&self, difficulty: Difficulty) -> u32 {
        self.base_mistakes.saturating_sub(difficulty.steps()).max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alphabet == 0 {
            return Err(ConfigError::EmptyAlphabet);
        }
        if self.alphabet > MAX_ALPHABET {
            return Err(ConfigError::AlphabetTooLarge {
                alphabet: self.alphabet,
                max: MAX_ALPHABET,
            });
        }
        // Difficulty 1 must fit; harder levels are clamped by start_len/target_len.
        let easiest = self.base_length.max(1).saturating_add(self.extra_rounds);
        if easiest > MAX_SEQUENCE_LEN {
            return Err(ConfigError::SequenceTooLong {
                length: easiest,
                max: MAX_SEQUENCE_LEN,
            });
        }
        require_positive(self.reveal_seconds, "sequence.reveal_seconds")?;
        require_non_negative(self.reveal_step, "sequence.reveal_step")?;
        require_positive(self.min_reveal_seconds, "sequence.min_reveal_seconds")
    }
}

/// Memory-card tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    /// Row width of the board; cursor navigation wraps on it.
    pub columns: u32,
    pub rows: u32,
    /// How long every card is shown before play starts, at difficulty 1.
    pub reveal_seconds: f32,
    pub reveal_step: f32,
    pub min_reveal_seconds: f32,
    pub base_mistakes: u32,
    pub mistake_step: u32,
    /// Delay between flipping the second card and judging the pair.
    pub settle_seconds: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 3,
            reveal_seconds: 3.0,
            reveal_step: 0.75,
            min_reveal_seconds: 1.0,
            base_mistakes: 6,
            mistake_step: 2,
            settle_seconds: 0.6,
        }
    }
}

impl MatchTuning {
    pub fn cell_count(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn reveal_duration(&self, difficulty: Difficulty) -> f32 {
        (self.reveal_seconds - self.reveal_step.max(0.0) * difficulty.steps() as f32)
            .max(self.min_reveal_seconds)
    }

    pub fn max_mistakes(&self, difficulty: Difficulty) -> u32 {
        self.base_mistakes
            .saturating_sub(self.mistake_step.saturating_mul(difficulty.steps()))
            .max(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cells = self.cell_count();
        // Symbols are u8, so at most 256 distinct pairs.
        if cells == 0 || cells % 2 != 0 || cells / 2 > 256 {
            return Err(ConfigError::InvalidBoard {
                columns: self.columns,
                rows: self.rows,
            });
        }
        require_positive(self.reveal_seconds, "matching.reveal_seconds")?;
        require_non_negative(self.reveal_step, "matching.reveal_step")?;
        require_positive(self.min_reveal_seconds, "matching.min_reveal_seconds")
    }
}

/// Rhythm (timing window) tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingTuning {
    /// Indicator sweeps (one end of the track to the other) per second at difficulty 1.
    pub base_speed: f32,
    pub speed_step: f32,
    /// Centre of the target zone on the 0..1 track.
    pub zone_center: f32,
    pub zone_width: f32,
    pub zone_width_step: f32,
    pub min_zone_width: f32,
    pub required_hits: u32,
    pub max_attempts: u32,
    /// Triggers arriving sooner than this after the previous attempt are ignored.
    pub trigger_cooldown_seconds: f32,
    pub easing: Easing,
}

impl Default for TimingTuning {
    fn default() -> Self {
        Self {
            base_speed: 0.6,
            speed_step: 0.25,
            zone_center: 0.5,
            zone_width: 0.24,
            zone_width_step: 0.06,
            min_zone_width: 0.08,
            required_hits: 3,
            max_attempts: 5,
            trigger_cooldown_seconds: 0.2,
            easing: Easing::Linear,
        }
    }
}

impl TimingTuning {
    pub fn speed(&self, difficulty: Difficulty) -> f32 {
        self.base_speed + self.speed_step.max(0.0) * difficulty.steps() as f32
    }

    /// Target zone as `(start, end)` on the 0..1 track.
    pub fn zone(&self, difficulty: Difficulty) -> (f32, f32) {
        let width = (self.zone_width - self.zone_width_step.max(0.0) * difficulty.steps() as f32)
            .max(self.min_zone_width);
        let half = width / 2.0;
        (
            (self.zone_center - half).max(0.0),
            (self.zone_center + half).min(1.0),
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive(self.base_speed, "timing.base_speed")?;
        require_positive(self.zone_width, "timing.zone_width")?;
        require_positive(self.min_zone_width, "timing.min_zone_width")?;
        require_non_negative(self.speed_step, "timing.speed_step")?;
        require_non_negative(self.zone_width_step, "timing.zone_width_step")?;
        if self.required_hits == 0 || self.required_hits > self.max_attempts {
            return Err(ConfigError::InvalidHitTarget {
                required: self.required_hits,
                attempts: self.max_attempts,
            });
        }
        let half = self.zone_width.max(self.min_zone_width) / 2.0;
        let (start, end) = (self.zone_center - half, self.zone_center + half);
        if start < 0.0 || end > 1.0 {
            return Err(ConfigError::InvalidZone { start, end });
        }
        Ok(())
    }
}
