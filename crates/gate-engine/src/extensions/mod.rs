// extensions/mod.rs
//
// Small math helpers shared by puzzles. No puzzle state lives here.

pub mod easing;

pub use easing::{Easing, ping_pong};
