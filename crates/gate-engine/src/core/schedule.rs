// core/schedule.rs
//
// Cooperative timed waits: a queue of (delay, action) steps advanced by one tick.
// Each delay is measured from the moment the previous step fired, so a queue
// reads like a script: show, wait, hide, wait, show...
//
// Usage:
//   let mut steps = Scheduler::new();
//   steps.then(0.5, Step::Show(0));
//   steps.then(0.6, Step::Hide(0));
//   steps.tick(dt, &mut fired);  // fired gets every action whose delay elapsed

use std::collections::VecDeque;

/// Slack used when comparing accumulated frame time against a delay, so a
/// wait of 0.3s fires after three 0.1s ticks despite f32 rounding.
const TIME_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone)]
struct Step<S> {
    delay: f32,
    action: S,
}

/// Per-session queue of timed steps.
#[derive(Debug, Clone)]
pub struct Scheduler<S> {
    steps: VecDeque<Step<S>>,
    /// Time accumulated toward the front step.
    elapsed: f32,
}

impl<S> Scheduler<S> {
    pub fn new() -> Self {
        Self {
            steps: VecDeque::new(),
            elapsed: 0.0,
        }
    }

    /// Queue `action` to fire `delay` seconds after the previously queued step
    /// (or after now, if the queue is empty). Negative delays count as zero.
    pub fn then(&mut self, delay: f32, action: S) {
        if self.steps.is_empty() {
            self.elapsed = 0.0;
        }
        self.steps.push_back(Step {
            delay: delay.max(0.0),
            action,
        });
    }

    /// Advance by `dt` seconds, appending every action that came due, in order.
    /// Leftover time carries into the next step, so one long frame can fire several.
    pub fn tick(&mut self, dt: f32, fired: &mut Vec<S>) {
        if self.steps.is_empty() {
            return;
        }
        self.elapsed += dt.max(0.0);

        while let Some(front) = self.steps.front() {
            if self.elapsed + TIME_EPSILON < front.delay {
                break;
            }
            self.elapsed = (self.elapsed - front.delay).max(0.0);
            if let Some(step) = self.steps.pop_front() {
                fired.push(step.action);
            }
        }

        if self.steps.is_empty() {
            self.elapsed = 0.0;
        }
    }

    /// Abandon every pending step without firing it.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.elapsed = 0.0;
    }

    /// Whether nothing is waiting.
    pub fn is_idle(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Seconds until the front step fires, if any.
    pub fn time_to_next(&self) -> Option<f32> {
        self.steps
            .front()
            .map(|step| (step.delay - self.elapsed).max(0.0))
    }
}

impl<S> Default for Scheduler<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_order_after_delays() {
        let mut steps = Scheduler::new();
        steps.then(0.5, 'a');
        steps.then(0.25, 'b');

        let mut fired = Vec::new();
        steps.tick(0.4, &mut fired);
        assert!(fired.is_empty());

        steps.tick(0.1, &mut fired);
        assert_eq!(fired, vec!['a']);

        steps.tick(0.25, &mut fired);
        assert_eq!(fired, vec!['a', 'b']);
        assert!(steps.is_idle());
    }

    #[test]
    fn long_frame_fires_several_steps() {
        let mut steps = Scheduler::new();
        steps.then(0.0, 1);
        steps.then(0.3, 2);
        steps.then(0.3, 3);
        steps.then(5.0, 4);

        let mut fired = Vec::new();
        steps.tick(1.0, &mut fired);
        assert_eq!(fired, vec![1, 2, 3]);
        assert_eq!(steps.len(), 1);
        assert!((steps.time_to_next().unwrap() - 4.6).abs() < 1e-3);
    }

    #[test]
    fn small_ticks_reach_delay_despite_rounding() {
        let mut steps = Scheduler::new();
        steps.then(0.3, ());

        let mut fired = Vec::new();
        for _ in 0..3 {
            steps.tick(0.1, &mut fired);
        }
        assert_eq!(fired.len(), 1);
    }

    #[test]
    fn clear_abandons_pending_steps() {
        let mut steps = Scheduler::new();
        steps.then(0.1, "never");
        steps.clear();

        let mut fired = Vec::new();
        steps.tick(10.0, &mut fired);
        assert!(fired.is_empty());
        assert_eq!(steps.time_to_next(), None);
    }

    #[test]
    fn queue_restarts_cleanly_after_draining() {
        let mut steps = Scheduler::new();
        steps.then(0.2, 1);
        let mut fired = Vec::new();
        steps.tick(0.5, &mut fired);

        // Idle time must not count toward a step queued later.
        steps.tick(3.0, &mut fired);
        steps.then(0.2, 2);
        steps.tick(0.1, &mut fired);
        assert_eq!(fired, vec![1]);
    }
}
