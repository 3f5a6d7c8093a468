//! Fixed-step scheduler decoupled from the display refresh rate.

use crate::float::Float;

/// Turns frame timestamps into a whole number of fixed steps.
///
/// The frame delta is capped at `max_frame_ms` and the step count at
/// `max_steps_per_frame`, so a backgrounded tab does not return to an
/// exploded simulation. Leftover time carries into the next frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Runner<F: Float> {
    fixed_step_ms: F,
    max_frame_ms: F,
    max_steps: u32,
    accumulator: F,
    last_ms: Option<f64>,
    running: bool,
}

impl<F: Float> Runner<F> {
    pub fn new(fixed_step_ms: F, max_frame_ms: F, max_steps: u32) -> Self {
        Runner {
            fixed_step_ms,
            max_frame_ms,
            max_steps: max_steps.max(1),
            accumulator: F::zero(),
            last_ms: None,
            running: true,
        }
    }

    /// Number of fixed steps to run for a frame at `now_ms`. The first call
    /// only records the time base.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        if !self.running || !now_ms.is_finite() {
            return 0;
        }
        let Some(last) = self.last_ms.replace(now_ms) else {
            return 0;
        };
        let delta = F::from_f64(now_ms - last).max(F::zero()).min(self.max_frame_ms);
        self.accumulator = self.accumulator + delta;

        let epsilon = F::from_f32(1e-6);
        let mut steps = 0;
        while self.accumulator + epsilon >= self.fixed_step_ms && steps < self.max_steps {
            self.accumulator = self.accumulator - self.fixed_step_ms;
            steps += 1;
        }
        if steps == self.max_steps && self.accumulator >= self.fixed_step_ms {
            tracing::trace!(
                dropped_ms = self.accumulator.to_f64(),
                "step cap reached, dropping backlog"
            );
            self.accumulator = F::zero();
        }
        self.accumulator = self.accumulator.max(F::zero());
        steps
    }

    /// Forget the time base, e.g. after the page was hidden.
    pub fn reset_clock(&mut self) {
        self.last_ms = None;
        self.accumulator = F::zero();
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.reset_clock();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
