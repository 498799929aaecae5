pub mod runner;

pub use runner::{PuzzleRunner, WebHost};

use std::cell::RefCell;

use gate_engine::{Difficulty, Outcome, PuzzleConfig, PuzzleKind};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<PuzzleRunner>> = RefCell::new(None);
    /// JS callbacks resolved during a call, invoked once the runner is released.
    static CALLBACKS: RefCell<Vec<js_sys::Function>> = RefCell::new(Vec::new());
}

fn with_runner<R>(f: impl FnOnce(&mut PuzzleRunner) -> R) -> Option<R> {
    let result = RUNNER.with(|cell| cell.borrow_mut().as_mut().map(f));
    if result.is_none() {
        log::warn!("puzzle runner not initialized; call puzzle_init() first");
    }
    flush_callbacks();
    result
}

/// Defer a JS callback until the runner borrow ends, so it may call back in.
fn deferred(callback: js_sys::Function) -> impl FnOnce() + 'static {
    move || CALLBACKS.with(|queue| queue.borrow_mut().push(callback))
}

fn flush_callbacks() {
    loop {
        let next = CALLBACKS.with(|queue| {
            let mut queue = queue.borrow_mut();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        });
        let Some(callback) = next else {
            break;
        };
        if let Err(err) = callback.call0(&JsValue::NULL) {
            web_sys::console::error_2(&"puzzle callback threw:".into(), &err);
        }
    }
}

fn outcome_code(outcome: Option<Outcome>) -> u32 {
    match outcome {
        None => 0,
        Some(Outcome::Solved) => 1,
        Some(Outcome::Failed) => 2,
        Some(Outcome::Cancelled) => 3,
    }
}

/// Create the runner. `seed` 0 seeds from the clock.
#[wasm_bindgen]
pub fn puzzle_init(seed: u32) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let seed = if seed == 0 {
        js_sys::Date::now() as u64
    } else {
        u64::from(seed)
    };
    let runner = PuzzleRunner::new(PuzzleConfig::default(), seed);
    // Replacing a runner mid-session cancels that session.
    let previous = RUNNER.with(|cell| cell.borrow_mut().replace(runner));
    drop(previous);
    flush_callbacks();
    log::info!("gate: initialized");
}

/// Load tuning and key bindings from JSON. Returns false if the JSON is
/// invalid or a session is running.
#[wasm_bindgen]
pub fn puzzle_load_config(json: &str) -> bool {
    with_runner(|r| match r.load_config(json) {
        Ok(applied) => applied,
        Err(err) => {
            log::error!("puzzle config rejected: {}", err);
            false
        }
    })
    .unwrap_or(false)
}

/// Start a puzzle (`kind`: 0 sequence, 1 match, 2 timing). Exactly one of the
/// callbacks fires later, or `on_cancelled` fires right away if the puzzle
/// cannot start (the return value is then false).
#[wasm_bindgen]
pub fn puzzle_start(kind: u32, difficulty: u32, on_solved: js_sys::Function, on_cancelled: js_sys::Function) -> bool {
    let Some(kind) = PuzzleKind::from_code(kind) else {
        log::warn!("unknown puzzle kind {}", kind);
        deferred(on_cancelled)();
        flush_callbacks();
        return false;
    };
    let on_solved = deferred(on_solved);
    let on_cancelled = deferred(on_cancelled);
    let started = RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(r) => r
            .start(kind, Difficulty::from(difficulty), on_solved, on_cancelled)
            .is_ok(),
        None => {
            log::warn!("puzzle runner not initialized; call puzzle_init() first");
            on_cancelled();
            false
        }
    });
    flush_callbacks();
    started
}

#[wasm_bindgen]
pub fn puzzle_cancel() {
    with_runner(|r| r.cancel());
}

#[wasm_bindgen]
pub fn puzzle_key_down(key_code: u32) {
    with_runner(|r| r.key_down(key_code));
}

/// Advance one animation frame by real elapsed seconds. Returns 0 while the
/// session runs (or none is active), else 1 solved, 2 failed, 3 cancelled.
#[wasm_bindgen]
pub fn puzzle_tick(dt: f32) -> u32 {
    outcome_code(with_runner(|r| r.tick(dt)).flatten())
}

#[wasm_bindgen]
pub fn puzzle_is_active() -> bool {
    with_runner(|r| r.is_active()).unwrap_or(false)
}

/// True while a session holds the host game paused.
#[wasm_bindgen]
pub fn puzzle_host_paused() -> bool {
    with_runner(|r| r.host_paused()).unwrap_or(false)
}

#[wasm_bindgen]
pub fn puzzle_indicator_position() -> f32 {
    with_runner(|r| r.indicator_position()).unwrap_or(-1.0)
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_sound_events_ptr() -> *const u8 {
    with_runner(|r| r.sound_events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_sound_events_len() -> u32 {
    with_runner(|r| r.sound_events_len()).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_puzzle_events_ptr() -> *const f32 {
    with_runner(|r| r.puzzle_events_ptr()).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_puzzle_events_len() -> u32 {
    with_runner(|r| r.puzzle_events_len()).unwrap_or(0)
}
