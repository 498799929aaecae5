//! Memory cards: every card is shown briefly, then the player uncovers pairs.

use glam::IVec2;

use crate::api::challenge::{Challenge, ChallengeContext};
use crate::api::types::{Cue, Difficulty, Outcome, PuzzleEvent, PuzzleKind, Symbol};
use crate::config::{ConfigError, MatchTuning};
use crate::core::rng::{shuffle, RandomSource};
use crate::core::schedule::Scheduler;
use crate::input::queue::{Direction, PuzzleInput};

/// A single card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    symbol: Symbol,
    matched: bool,
    revealed: bool,
}

impl Cell {
    fn hidden(symbol: Symbol) -> Self {
        Self {
            symbol,
            matched: false,
            revealed: false,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Once set, never cleared for the rest of the run.
    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }
}

/// Row-major grid of cards. Every symbol sits on exactly two cells.
#[derive(Debug, Clone, Default)]
pub struct Board {
    cells: Vec<Cell>,
    columns: usize,
}

impl Board {
    /// Deal `columns * rows / 2` pairs and shuffle them across the grid.
    pub fn shuffled(columns: usize, rows: usize, rng: &mut dyn RandomSource) -> Self {
        let pairs = columns * rows / 2;
        let mut symbols: Vec<Symbol> = (0..pairs)
            .flat_map(|pair| [Symbol(pair as u8); 2])
            .collect();
        shuffle(&mut symbols, rng);
        Self {
            cells: symbols.into_iter().map(Cell::hidden).collect(),
            columns,
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.cells.len() / self.columns
        }
    }

    pub fn all_matched(&self) -> bool {
        self.cells.iter().all(|cell| cell.matched)
    }

    /// Where the cursor lands when moving from `from` in `direction`.
    ///
    /// Left/Right walk the board in reading order and wrap from the last cell
    /// to the first, so every open card is reachable with them alone.
    /// Up/Down stay in the column and wrap top to bottom. Matched cards are
    /// skipped until the whole board is matched; if no open card lies in
    /// that direction the cursor stays put.
    pub fn neighbor(&self, from: usize, direction: Direction) -> usize {
        if self.cells.is_empty() || from >= self.cells.len() {
            return from;
        }
        let skip_matched = !self.all_matched();
        let mut index = from;
        for _ in 0..self.cells.len() {
            index = self.step(index, direction.delta());
            if index == from {
                break;
            }
            if !skip_matched || !self.cells[index].matched {
                return index;
            }
        }
        from
    }

    fn step(&self, index: usize, delta: IVec2) -> usize {
        let len = self.cells.len() as i32;
        let columns = self.columns as i32;
        let index = index as i32;
        if delta.y == 0 {
            (index + delta.x).rem_euclid(len) as usize
        } else {
            let rows = len / columns;
            let row = (index / columns + delta.y).rem_euclid(rows);
            (row * columns + index % columns) as usize
        }
    }

    /// First unmatched cell at or after `start` in reading order, wrapping.
    pub fn first_unmatched_from(&self, start: usize) -> Option<usize> {
        let len = self.cells.len();
        (0..len)
            .map(|offset| (start + offset) % len)
            .find(|&index| !self.cells[index].matched)
    }

    fn set_all_revealed(&mut self, revealed: bool) {
        for cell in &mut self.cells {
            cell.revealed = revealed;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    Idle,
    /// Whole board face up. Input other than cancel is dropped.
    Revealing,
    /// Player moves the cursor and flips cards.
    Selecting,
    /// Two cards are up; waiting out the settle delay before judging them.
    Comparing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStep {
    HideAll,
    Compare,
}

pub struct MatchChallenge {
    tuning: MatchTuning,
    phase: MatchPhase,
    board: Board,
    cursor: usize,
    /// First card of the pair being uncovered.
    pending: Option<usize>,
    /// Second card, set while comparing.
    second: Option<usize>,
    mistakes: u32,
    max_mistakes: u32,
    steps: Scheduler<MatchStep>,
    fired: Vec<MatchStep>,
}

impl MatchChallenge {
    pub fn new(tuning: MatchTuning) -> Self {
        Self {
            tuning,
            phase: MatchPhase::Idle,
            board: Board::default(),
            cursor: 0,
            pending: None,
            second: None,
            mistakes: 0,
            max_mistakes: 0,
            steps: Scheduler::new(),
            fired: Vec::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn mistakes(&self) -> u32 {
        self.mistakes
    }

    pub fn max_mistakes(&self) -> u32 {
        self.max_mistakes
    }

    fn navigate(&mut self, direction: Direction, ctx: &mut ChallengeContext) {
        let next = self.board.neighbor(self.cursor, direction);
        if next != self.cursor {
            self.cursor = next;
            ctx.emit(PuzzleEvent::CursorMoved { index: next });
        }
    }

    fn select(&mut self, ctx: &mut ChallengeContext) {
        let index = self.cursor;
        let Some(cell) = self.board.cells.get_mut(index) else {
            return;
        };
        if cell.matched || cell.revealed {
            return;
        }
        cell.revealed = true;
        let symbol = cell.symbol;
        ctx.play(Cue::Flip);
        ctx.emit(PuzzleEvent::CellRevealed { index, symbol });

        match self.pending {
            None => self.pending = Some(index),
            Some(_) => {
                self.second = Some(index);
                self.phase = MatchPhase::Comparing;
                self.steps.then(self.tuning.settle_seconds, MatchStep::Compare);
            }
        }
    }

    fn compare(&mut self, ctx: &mut ChallengeContext) -> Option<Outcome> {
        self.phase = MatchPhase::Selecting;
        let (Some(first), Some(second)) = (self.pending.take(), self.second.take()) else {
            log::warn!("match: compare fired without two cards up");
            return None;
        };

        if self.board.cells[first].symbol == self.board.cells[second].symbol {
            self.board.cells[first].matched = true;
            self.board.cells[second].matched = true;
            ctx.play(Cue::Match);
            ctx.emit(PuzzleEvent::PairMatched { first, second });

            if self.board.all_matched() {
                ctx.play(Cue::Solved);
                self.stop();
                return Some(Outcome::Solved);
            }
            if self.board.cells[self.cursor].matched {
                if let Some(open) = self.board.first_unmatched_from(self.cursor) {
                    self.cursor = open;
                    ctx.emit(PuzzleEvent::CursorMoved { index: open });
                }
            }
            return None;
        }

        self.board.cells[first].revealed = false;
        self.board.cells[second].revealed = false;
        self.mistakes += 1;
        ctx.play(Cue::Mismatch);
        ctx.emit(PuzzleEvent::PairMismatched { first, second });
        ctx.emit(PuzzleEvent::Mistake {
            mistakes: self.mistakes,
            allowed: self.max_mistakes,
        });
        if self.mistakes >= self.max_mistakes {
            ctx.play(Cue::Failed);
            self.stop();
            return Some(Outcome::Failed);
        }
        None
    }

    fn apply(&mut self, step: MatchStep, ctx: &mut ChallengeContext) -> Option<Outcome> {
        match step {
            MatchStep::HideAll => {
                self.board.set_all_revealed(false);
                self.phase = MatchPhase::Selecting;
                ctx.emit(PuzzleEvent::BoardHidden);
                ctx.emit(PuzzleEvent::CursorMoved { index: self.cursor });
                None
            }
            MatchStep::Compare => self.compare(ctx),
        }
    }

    fn stop(&mut self) {
        self.phase = MatchPhase::Idle;
        self.pending = None;
        self.second = None;
        self.steps.clear();
    }
}

impl Challenge for MatchChallenge {
    fn kind(&self) -> PuzzleKind {
        PuzzleKind::Match
    }

    fn activate(&mut self, difficulty: Difficulty, ctx: &mut ChallengeContext) -> Result<(), ConfigError> {
        self.stop();
        self.tuning.validate()?;

        self.board = Board::shuffled(self.tuning.columns as usize, self.tuning.rows as usize, ctx.rng());
        self.cursor = 0;
        self.mistakes = 0;
        self.max_mistakes = self.tuning.max_mistakes(difficulty);

        self.board.set_all_revealed(true);
        self.phase = MatchPhase::Revealing;
        ctx.emit(PuzzleEvent::BoardRevealed);
        self.steps.then(self.tuning.reveal_duration(difficulty), MatchStep::HideAll);
        Ok(())
    }

    fn update(&mut self, ctx: &mut ChallengeContext, input: &[PuzzleInput], dt: f32) -> Option<Outcome> {
        if self.phase == MatchPhase::Idle {
            return None;
        }

        for &event in input {
            if event == PuzzleInput::Cancel {
                self.cancel(ctx);
                return Some(Outcome::Cancelled);
            }
            if self.phase != MatchPhase::Selecting {
                continue;
            }
            match event {
                PuzzleInput::Navigate(direction) => self.navigate(direction, ctx),
                PuzzleInput::Confirm => self.select(ctx),
                _ => {}
            }
        }

        let mut fired = std::mem::take(&mut self.fired);
        self.steps.tick(dt, &mut fired);
        let mut outcome = None;
        for step in fired.drain(..) {
            outcome = self.apply(step, ctx);
            if outcome.is_some() {
                break;
            }
        }
        fired.clear();
        self.fired = fired;
        outcome
    }

    fn cancel(&mut self, ctx: &mut ChallengeContext) {
        if self.phase != MatchPhase::Idle {
            ctx.play(Cue::Cancelled);
            self.stop();
        }
    }

    fn is_active(&self) -> bool {
        self.phase != MatchPhase::Idle
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::core::rng::Rng;

    fn setup(tuning: MatchTuning, difficulty: Difficulty) -> (MatchChallenge, ChallengeContext) {
        let mut ctx = ChallengeContext::seeded(77);
        let mut challenge = MatchChallenge::new(tuning);
        challenge.activate(difficulty, &mut ctx).unwrap();
        (challenge, ctx)
    }

    fn finish_reveal(challenge: &mut MatchChallenge, ctx: &mut ChallengeContext) {
        for _ in 0..200 {
            if challenge.phase() == MatchPhase::Selecting {
                return;
            }
            challenge.update(ctx, &[], 0.1);
        }
        panic!("board never hid");
    }

    fn move_to(challenge: &mut MatchChallenge, ctx: &mut ChallengeContext, target: usize) {
        for _ in 0..=challenge.board().len() {
            if challenge.cursor() == target {
                return;
            }
            challenge.update(ctx, &[PuzzleInput::Navigate(Direction::Right)], 0.0);
        }
        panic!("cursor never reached {}", target);
    }

    fn settle(challenge: &mut MatchChallenge, ctx: &mut ChallengeContext) -> Option<Outcome> {
        for _ in 0..100 {
            let outcome = challenge.update(ctx, &[], 0.1);
            if outcome.is_some() || challenge.phase() != MatchPhase::Comparing {
                return outcome;
            }
        }
        panic!("comparison never resolved");
    }

    fn flip_pair(challenge: &mut MatchChallenge, ctx: &mut ChallengeContext, a: usize, b: usize) -> Option<Outcome> {
        move_to(challenge, ctx, a);
        challenge.update(ctx, &[PuzzleInput::Confirm], 0.0);
        move_to(challenge, ctx, b);
        challenge.update(ctx, &[PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.phase(), MatchPhase::Comparing);
        settle(challenge, ctx)
    }

    fn pairs(board: &Board) -> Vec<(usize, usize)> {
        let mut seen: HashMap<Symbol, usize> = HashMap::new();
        let mut pairs = Vec::new();
        for (index, cell) in board.cells().iter().enumerate() {
            if let Some(first) = seen.insert(cell.symbol(), index) {
                pairs.push((first, index));
            }
        }
        pairs
    }

    fn mismatched(board: &Board) -> (usize, usize) {
        let open: Vec<usize> = (0..board.len()).filter(|&i| !board.cells()[i].is_matched()).collect();
        for &a in &open {
            for &b in &open {
                if board.cells()[a].symbol() != board.cells()[b].symbol() {
                    return (a, b);
                }
            }
        }
        panic!("no mismatched pair left");
    }

    #[test]
    fn every_symbol_appears_exactly_twice() {
        let mut rng = Rng::new(5);
        for (columns, rows) in [(2, 1), (4, 3), (4, 4), (6, 5), (8, 1)] {
            let board = Board::shuffled(columns, rows, &mut rng);
            assert_eq!(board.len(), columns * rows);
            let mut counts: HashMap<Symbol, usize> = HashMap::new();
            for cell in board.cells() {
                *counts.entry(cell.symbol()).or_default() += 1;
                assert!(!cell.is_matched() && !cell.is_revealed());
            }
            assert_eq!(counts.len(), columns * rows / 2);
            assert!(counts.values().all(|&n| n == 2));
        }
    }

    #[test]
    fn board_is_shown_then_hidden() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        assert_eq!(challenge.phase(), MatchPhase::Revealing);
        assert!(challenge.board().cells().iter().all(Cell::is_revealed));

        // Selecting is not possible while the board is on show.
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 1.0);
        assert_eq!(challenge.pending(), None);
        assert_eq!(challenge.phase(), MatchPhase::Revealing);

        challenge.update(&mut ctx, &[], 2.0);
        assert_eq!(challenge.phase(), MatchPhase::Selecting);
        assert!(challenge.board().cells().iter().all(|c| !c.is_revealed() && !c.is_matched()));
    }

    #[test]
    fn perfect_play_solves() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::HARD);
        finish_reveal(&mut challenge, &mut ctx);
        let all = pairs(challenge.board());

        let mut outcome = None;
        for (a, b) in all {
            outcome = flip_pair(&mut challenge, &mut ctx, a, b);
        }
        assert_eq!(outcome, Some(Outcome::Solved));
        assert_eq!(challenge.mistakes(), 0);
        assert!(challenge.board().all_matched());
        assert!(!challenge.is_active());
    }

    #[test]
    fn solves_despite_earlier_mistakes() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        finish_reveal(&mut challenge, &mut ctx);
        let allowed = challenge.max_mistakes();

        for _ in 0..allowed - 1 {
            let (a, b) = mismatched(challenge.board());
            assert_eq!(flip_pair(&mut challenge, &mut ctx, a, b), None);
        }
        assert_eq!(challenge.mistakes(), allowed - 1);

        let mut outcome = None;
        for (a, b) in pairs(challenge.board()) {
            outcome = flip_pair(&mut challenge, &mut ctx, a, b);
        }
        assert_eq!(outcome, Some(Outcome::Solved));
    }

    #[test]
    fn mismatch_hides_cards_and_counts_a_mistake() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        finish_reveal(&mut challenge, &mut ctx);
        let (a, b) = mismatched(challenge.board());

        assert_eq!(flip_pair(&mut challenge, &mut ctx, a, b), None);
        assert_eq!(challenge.mistakes(), 1);
        assert_eq!(challenge.phase(), MatchPhase::Selecting);
        assert_eq!(challenge.pending(), None);
        let cells = challenge.board().cells();
        assert!(!cells[a].is_revealed() && !cells[b].is_revealed());
        assert!(!cells[a].is_matched() && !cells[b].is_matched());
    }

    #[test]
    fn running_out_of_mistakes_fails() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::HARD);
        finish_reveal(&mut challenge, &mut ctx);
        let allowed = challenge.max_mistakes();

        let mut outcome = None;
        for _ in 0..allowed {
            let (a, b) = mismatched(challenge.board());
            outcome = flip_pair(&mut challenge, &mut ctx, a, b);
        }
        assert_eq!(outcome, Some(Outcome::Failed));
        assert!(!challenge.is_active());
    }

    #[test]
    fn selecting_revealed_or_matched_cell_does_nothing() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        finish_reveal(&mut challenge, &mut ctx);
        let (a, b) = pairs(challenge.board())[0];

        move_to(&mut challenge, &mut ctx, a);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm, PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.pending(), Some(a));
        assert_eq!(challenge.phase(), MatchPhase::Selecting);

        move_to(&mut challenge, &mut ctx, b);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);
        assert_eq!(settle(&mut challenge, &mut ctx), None);
        assert!(challenge.board().cells()[a].is_matched());

        // The cursor left the matched pair; matched cards cannot be reached or flipped.
        assert!(!challenge.board().cells()[challenge.cursor()].is_matched());
        let before = challenge.board().cells().to_vec();
        challenge.cursor = a;
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.board().cells(), before.as_slice());
        assert_eq!(challenge.pending(), None);
    }

    #[test]
    fn input_while_comparing_is_dropped() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        finish_reveal(&mut challenge, &mut ctx);
        let (a, b) = mismatched(challenge.board());
        move_to(&mut challenge, &mut ctx, a);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);
        move_to(&mut challenge, &mut ctx, b);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);

        let cursor = challenge.cursor();
        challenge.update(&mut ctx, &[PuzzleInput::Navigate(Direction::Right), PuzzleInput::Confirm], 0.0);
        assert_eq!(challenge.cursor(), cursor);
        assert_eq!(challenge.phase(), MatchPhase::Comparing);
    }

    #[test]
    fn navigation_wraps_and_skips_matched_cells() {
        let mut board = Board::shuffled(4, 3, &mut Rng::new(1));
        // Right walks reading order and wraps to the start.
        assert_eq!(board.neighbor(3, Direction::Right), 4);
        assert_eq!(board.neighbor(11, Direction::Right), 0);
        assert_eq!(board.neighbor(0, Direction::Left), 11);
        // Up/Down stay in the column.
        assert_eq!(board.neighbor(1, Direction::Up), 9);
        assert_eq!(board.neighbor(9, Direction::Down), 1);

        board.cells[1].matched = true;
        board.cells[5].matched = true;
        assert_eq!(board.neighbor(0, Direction::Right), 2);
        assert_eq!(board.neighbor(6, Direction::Left), 4);
        assert_eq!(board.neighbor(9, Direction::Up), 9);
        assert_eq!(board.neighbor(9, Direction::Down), 9);
    }

    #[test]
    fn navigation_moves_freely_once_everything_is_matched() {
        let mut board = Board::shuffled(2, 2, &mut Rng::new(2));
        for cell in &mut board.cells {
            cell.matched = true;
        }
        assert_eq!(board.neighbor(0, Direction::Right), 1);
        assert_eq!(board.neighbor(0, Direction::Down), 2);
    }

    #[test]
    fn cancel_while_comparing_abandons_the_judgement() {
        let (mut challenge, mut ctx) = setup(MatchTuning::default(), Difficulty::EASY);
        finish_reveal(&mut challenge, &mut ctx);
        let (a, b) = mismatched(challenge.board());
        move_to(&mut challenge, &mut ctx, a);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);
        move_to(&mut challenge, &mut ctx, b);
        challenge.update(&mut ctx, &[PuzzleInput::Confirm], 0.0);

        assert_eq!(challenge.update(&mut ctx, &[PuzzleInput::Cancel], 0.0), Some(Outcome::Cancelled));
        assert_eq!(challenge.update(&mut ctx, &[], 5.0), None);
        assert_eq!(challenge.mistakes(), 0);
    }

    #[test]
    fn odd_board_is_a_config_error() {
        let mut ctx = ChallengeContext::seeded(1);
        let mut challenge = MatchChallenge::new(MatchTuning { columns: 3, rows: 1, ..MatchTuning::default() });
        assert!(matches!(
            challenge.activate(Difficulty::EASY, &mut ctx),
            Err(ConfigError::InvalidBoard { .. })
        ));
        assert!(!challenge.is_active());
    }
}
