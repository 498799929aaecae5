/// Fixed-step accumulator fed with real (wall-clock) frame time.
///
/// Starting a puzzle pauses the host game, so puzzle timing must never be
/// driven by the host's game clock. Hosts feed this clock the unscaled frame
/// delta and it keeps running while the host simulation is frozen.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The fixed delta time per step.
    step: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Upper bound on steps per frame (after a stall, the excess is dropped).
    max_steps: u32,
    /// Total real time fed in, for diagnostics.
    real_elapsed: f64,
}

impl FrameClock {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            accumulator: 0.0,
            max_steps: 10,
            real_elapsed: 0.0,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time. Returns the number of fixed steps to run.
    /// Negative or non-finite deltas are ignored.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.real_elapsed += f64::from(frame_dt);
        self.accumulator += frame_dt;
        self.accumulator = self.accumulator.min(self.step * self.max_steps as f32);
        let steps = (self.accumulator / self.step) as u32;
        self.accumulator -= steps as f32 * self.step;
        steps
    }

    /// Interpolation alpha between steps (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn real_elapsed(&self) -> f64 {
        self.real_elapsed
    }

    /// Drop any partial step (e.g. after a long stall the host wants forgotten).
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut clock = FrameClock::new(1.0 / 60.0);
        assert_eq!(clock.accumulate(0.008), 0);
        assert_eq!(clock.accumulate(0.010), 1);
        let a = clock.alpha();
        assert!((0.0..=1.0).contains(&a), "alpha was {}", a);
    }

    #[test]
    fn caps_steps_after_stall() {
        let mut clock = FrameClock::new(0.25).with_max_steps(4);
        assert_eq!(clock.accumulate(5.0), 4);
        assert!((clock.real_elapsed() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn ignores_bogus_deltas() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.accumulate(-1.0), 0);
        assert_eq!(clock.accumulate(f32::NAN), 0);
        assert_eq!(clock.real_elapsed(), 0.0);
    }
}
