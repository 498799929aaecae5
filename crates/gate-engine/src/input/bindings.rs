use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::Symbol;
use crate::input::queue::{Direction, PuzzleInput};

// DOM key codes for the default layout.
const KEY_ENTER: u32 = 13;
const KEY_ESCAPE: u32 = 27;
const KEY_SPACE: u32 = 32;
const KEY_LEFT: u32 = 37;
const KEY_UP: u32 = 38;
const KEY_RIGHT: u32 = 39;
const KEY_DOWN: u32 = 40;
const KEY_DIGIT_1: u32 = 49;

/// Maps raw host key codes to puzzle inputs. Unbound keys are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    keys: HashMap<u32, PuzzleInput>,
}

impl KeyBindings {
    /// No keys bound.
    pub fn empty() -> Self {
        Self {
            keys: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key_code: u32, input: PuzzleInput) -> &mut Self {
        self.keys.insert(key_code, input);
        self
    }

    pub fn unbind(&mut self, key_code: u32) {
        self.keys.remove(&key_code);
    }

    pub fn resolve(&self, key_code: u32) -> Option<PuzzleInput> {
        self.keys.get(&key_code).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyBindings {
    /// Digits 1–4 play symbols 0–3, arrows navigate, Enter/Space confirm, Escape cancels.
    fn default() -> Self {
        let mut bindings = Self::empty();
        for symbol in 0..4u8 {
            bindings.bind(KEY_DIGIT_1 + u32::from(symbol), PuzzleInput::Symbol(Symbol(symbol)));
        }
        bindings
            .bind(KEY_UP, PuzzleInput::Navigate(Direction::Up))
            .bind(KEY_DOWN, PuzzleInput::Navigate(Direction::Down))
            .bind(KEY_LEFT, PuzzleInput::Navigate(Direction::Left))
            .bind(KEY_RIGHT, PuzzleInput::Navigate(Direction::Right))
            .bind(KEY_ENTER, PuzzleInput::Confirm)
            .bind(KEY_SPACE, PuzzleInput::Confirm)
            .bind(KEY_ESCAPE, PuzzleInput::Cancel);
        bindings
    }
}
