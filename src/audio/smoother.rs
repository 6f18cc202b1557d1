use crate::audio::constants::ramp_length_in_samples;

/// Linear ramp from the current value to a target over a fixed number of steps.
///
/// Owned by the audio thread. A new target restarts the full ramp from wherever the current
/// value is, and the ramp never steps past its target.
#[derive(Debug, Clone)]
pub struct LinearSmoother {
    current: f32,
    target: f32,
    step: f32,
    /// Steps left before `current` reaches `target`
    countdown: usize,
    /// Steps a full ramp takes at the active sample rate
    ramp_length: usize,
}

impl LinearSmoother {
    pub fn new(initial_value: f32) -> Self {
        Self {
            current: initial_value,
            target: initial_value,
            step: 0.0,
            countdown: 0,
            ramp_length: 0,
        }
    }

    /// Recompute the ramp length for a new sample rate and stop any ramp in flight
    pub fn reset(&mut self, sample_rate: f32, ramp_seconds: f64) {
        self.ramp_length = ramp_length_in_samples(sample_rate, ramp_seconds);
        self.set_current_and_target(self.target);
    }

    /// Jump straight to `value` with no ramp
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.countdown = 0;
    }

    /// Start ramping towards `value`. Setting the target it already has keeps the running ramp.
    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }

        if self.ramp_length == 0 {
            self.set_current_and_target(value);
            return;
        }

        self.target = value;
        self.countdown = self.ramp_length;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    /// Advance by one step and return the new current value
    pub fn next_value(&mut self) -> f32 {
        if !self.is_smoothing() {
            return self.target;
        }

        self.countdown -= 1;
        if self.is_smoothing() {
            self.current = self.bounded(self.current + self.step);
        } else {
            self.current = self.target;
        }

        self.current
    }

    /// Advance by `steps` at once. Used to account for a whole block in a single update.
    pub fn skip(&mut self, steps: usize) -> f32 {
        if steps >= self.countdown {
            self.set_current_and_target(self.target);
            return self.target;
        }

        self.current = self.bounded(self.current + self.step * steps as f32);
        self.countdown -= steps;
        self.current
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    pub fn ramp_length(&self) -> usize {
        self.ramp_length
    }

    /// Accumulated rounding must not carry the value past the target
    fn bounded(&self, value: f32) -> f32 {
        if self.step < 0.0 {
            value.max(self.target)
        } else {
            value.min(self.target)
        }
    }
}
