use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gate_engine::{
    default_source, AudioCue, ConfigError, Difficulty, DispatchError, EventRecord, FrameClock,
    HostPause, InputQueue, KeyBindings, Outcome, PuzzleConfig, PuzzleDispatcher, PuzzleInput,
    PuzzleKind, SoundEvent,
};

/// Host pause flag the page polls to freeze its own game loop and duck audio.
#[derive(Debug, Default)]
pub struct WebHost {
    paused: Cell<bool>,
}

impl WebHost {
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }
}

impl HostPause for WebHost {
    fn begin(&self) {
        self.paused.set(true);
    }

    fn end(&self) {
        self.paused.set(false);
    }
}

/// Collects cues until the runner packs them into the outgoing sound buffer.
struct QueuedAudio(Rc<RefCell<Vec<SoundEvent>>>);

impl AudioCue for QueuedAudio {
    fn play(&mut self, sound: SoundEvent) {
        self.0.borrow_mut().push(sound);
    }
}

/// Sound ids travel as single bytes. Ids that do not fit are rejected rather
/// than wrapped onto another cue.
fn pack_sound(sound: SoundEvent) -> Option<u8> {
    u8::try_from(sound.0).ok()
}

/// Wires the puzzle dispatcher to a browser frame loop.
///
/// The page pushes key codes, calls `tick` once per animation frame with the
/// real frame delta, and then reads the flat sound and event buffers through
/// the pointer accessors.
pub struct PuzzleRunner {
    dispatcher: PuzzleDispatcher,
    host: Rc<WebHost>,
    input: InputQueue,
    clock: FrameClock,
    bindings: KeyBindings,
    queued_sounds: Rc<RefCell<Vec<SoundEvent>>>,
    /// Flat buffer of sound ids for the page to read after each tick.
    sound_buffer: Vec<u8>,
    /// Presentation events drained this tick, 4 floats each.
    event_buffer: Vec<EventRecord>,
}

impl PuzzleRunner {
    pub fn new(config: PuzzleConfig, seed: u64) -> Self {
        let host = Rc::new(WebHost::default());
        let queued_sounds = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = PuzzleDispatcher::with_config(
            &config,
            host.clone(),
            Box::new(QueuedAudio(queued_sounds.clone())),
            default_source(seed),
        );

        Self {
            dispatcher,
            host,
            input: InputQueue::new(),
            clock: FrameClock::default(),
            bindings: config.keys,
            queued_sounds,
            sound_buffer: Vec::with_capacity(16),
            event_buffer: Vec::with_capacity(32),
        }
    }

    /// Replace tuning and key bindings from JSON. Refused while a session runs.
    pub fn load_config(&mut self, json: &str) -> Result<bool, ConfigError> {
        let config = PuzzleConfig::from_json(json)?;
        if !self.dispatcher.reconfigure(&config) {
            return Ok(false);
        }
        self.bindings = config.keys;
        log::info!("puzzle config loaded ({} key bindings)", self.bindings.len());
        Ok(true)
    }

    pub fn start(
        &mut self,
        kind: PuzzleKind,
        difficulty: Difficulty,
        on_solved: impl FnOnce() + 'static,
        on_cancelled: impl FnOnce() + 'static,
    ) -> Result<(), DispatchError> {
        let result = self.dispatcher.start(kind, difficulty, on_solved, on_cancelled);
        if result.is_ok() {
            // Stale keys and partial steps from before the session must not leak into it.
            self.input.clear();
            self.clock.reset();
        }
        result
    }

    pub fn cancel(&mut self) {
        self.dispatcher.cancel();
    }

    /// Translate a DOM key code through the bindings. Unbound keys are ignored.
    pub fn key_down(&mut self, key_code: u32) {
        if let Some(input) = self.bindings.resolve(key_code) {
            self.push_input(input);
        }
    }

    pub fn push_input(&mut self, input: PuzzleInput) {
        if self.dispatcher.is_active() {
            self.input.push(input);
        }
    }

    /// Run one animation frame. `dt` is real elapsed time, so the puzzle keeps
    /// moving while the host game is paused. Returns the outcome on the frame
    /// the session ends.
    pub fn tick(&mut self, dt: f32) -> Option<Outcome> {
        self.event_buffer.clear();
        self.sound_buffer.clear();

        let mut outcome = None;
        let steps = self.clock.accumulate(dt);
        if steps > 0 {
            // Input lands on the first step so it is judged against the state the player saw.
            let input = self.input.drain();
            let mut frame_input: &[PuzzleInput] = &input;
            for _ in 0..steps {
                outcome = self.dispatcher.update(self.clock.step(), frame_input);
                frame_input = &[];
                if outcome.is_some() {
                    break;
                }
            }
        }
        if !self.dispatcher.is_active() {
            self.input.clear();
        }

        self.collect_output();
        outcome
    }

    fn collect_output(&mut self) {
        for event in self.dispatcher.drain_events() {
            self.event_buffer.push(EventRecord::from(&event));
        }
        for sound in self.queued_sounds.borrow_mut().drain(..) {
            match pack_sound(sound) {
                Some(id) => self.sound_buffer.push(id),
                None => log::warn!("sound id {} does not fit the byte buffer; skipped", sound.0),
            }
        }
    }

    pub fn dispatcher(&self) -> &PuzzleDispatcher {
        &self.dispatcher
    }

    pub fn host_paused(&self) -> bool {
        self.host.is_paused()
    }

    pub fn is_active(&self) -> bool {
        self.dispatcher.is_active()
    }

    /// Current timing indicator position, or -1 when no timing session runs.
    pub fn indicator_position(&self) -> f32 {
        match (self.dispatcher.active_kind(), self.dispatcher.timing()) {
            (Some(PuzzleKind::Timing), Some(timing)) => timing.track().position(),
            _ => -1.0,
        }
    }

    // ---- Pointer accessors for buffer reads ----

    pub fn sound_events_ptr(&self) -> *const u8 {
        self.sound_buffer.as_ptr()
    }

    pub fn sound_events_len(&self) -> u32 {
        self.sound_buffer.len() as u32
    }

    pub fn sound_events(&self) -> &[u8] {
        &self.sound_buffer
    }

    pub fn puzzle_events_ptr(&self) -> *const f32 {
        bytemuck::cast_slice::<EventRecord, f32>(&self.event_buffer).as_ptr()
    }

    /// Number of event records (each `EventRecord::FLOATS` floats).
    pub fn puzzle_events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn puzzle_events(&self) -> &[EventRecord] {
        &self.event_buffer
    }
}
